#[path = "integration/pipeline.rs"]
mod pipeline;
#[path = "integration/cli.rs"]
mod cli;
#[path = "integration/properties.rs"]
mod properties;
