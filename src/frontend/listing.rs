//! Node listings
//!
//! One line per token or AST node: slot index, kind, flags, count, source
//! position and the decoded payload.

use std::io;

use super::core::arena::{Offset, Region};
use super::core::lexer::{AstNode, AstType, Data};
use super::core::names::NameTable;
use super::core::node_array::NodeArray;

/// Decoded payload of a two-slot node
pub fn payload(
    node: &AstNode,
    data: Data,
    names: &NameTable,
    statics: &Region<u8>,
) -> String {
    match node.kind {
        AstType::Identifier
        | AstType::Variable
        | AstType::EnumLiteral
        | AstType::NamedInfered
        | AstType::GetField => names.resolve_str(data.as_name()).into_owned(),
        AstType::Unsigned => data.as_u64().to_string(),
        AstType::Float32 => format!("{:?}", data.as_f32()),
        AstType::Float64 => format!("{:?}", data.as_f64()),
        AstType::Character => match char::from_u32(data.as_code()) {
            Some(c) => format!("{c:?}"),
            None => format!("U+{:04X}", data.as_code()),
        },
        AstType::String => {
            let buf = data.as_static();
            let end = buf.offset as usize + buf.size as usize;
            if end > statics.len() {
                return format!("<static {}+{}>", buf.offset, buf.size);
            }
            let bytes = statics.bytes(Offset(buf.offset), buf.size as usize);
            format!("{:?}", String::from_utf8_lossy(bytes))
        }
        AstType::Procedure => {
            let header = data.as_proc_header();
            format!(
                "end=+{} params={} infered={} defaults={}",
                header.end_offset, header.params, header.infered, header.defaults
            )
        }
        AstType::StartScope => format!("end=+{}", data.as_end_offset()),
        _ => format!("{:#x}", data.as_u64()),
    }
}

/// One listing line, without the line break
pub fn format_node(
    index: usize,
    node: &AstNode,
    data: Option<Data>,
    names: &NameTable,
    statics: &Region<u8>,
) -> String {
    let line = format!(
        "{index:>5} {:<16} flags={:#04x} count={:<3} pos={}",
        node.kind.name(),
        node.flags.0,
        node.count,
        node.pos
    );
    match data {
        Some(data) => format!("{line} {}", payload(node, data, names, statics)),
        None => line,
    }
}

/// Write every node after the sentinel
pub fn write_listing(
    out: &mut dyn io::Write,
    nodes: &NodeArray,
    names: &NameTable,
    statics: &Region<u8>,
) -> io::Result<()> {
    for (index, node, data) in nodes.iter() {
        writeln!(out, "{}", format_node(index, &node, data, names, statics))?;
    }
    Ok(())
}
