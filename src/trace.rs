use std::{str::FromStr, sync::Mutex};

use tracing_subscriber::{filter::LevelFilter, prelude::*, Registry};

use crate::error::Error;

#[derive(Debug)]
pub struct TraceConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

pub fn prepare_tracing(conf: TraceConfig) -> Result<(), Error> {
    let level = LevelFilter::from_str(&conf.level).map_err(|e| Error::Trace(e.to_string()))?;

    let res = if let Some(path) = conf.file {
        let file = std::fs::File::create(&path).map_err(|e| Error::Trace(format!("{path}: {e}")))?;
        let writer = Mutex::new(file);
        if conf.format == "json" {
            Registry::default()
                .with(tracing_subscriber::fmt::Layer::new().with_writer(writer).json())
                .with(level)
                .try_init()
        } else {
            Registry::default()
                .with(tracing_subscriber::fmt::Layer::new().with_writer(writer).with_ansi(false))
                .with(level)
                .try_init()
        }
    } else if conf.format == "json" {
        Registry::default()
            .with(tracing_subscriber::fmt::Layer::new().with_writer(std::io::stderr).json())
            .with(level)
            .try_init()
    } else {
        Registry::default()
            .with(tracing_subscriber::fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
            .with(level)
            .try_init()
    };
    res.map_err(|e| Error::Trace(e.to_string()))
}
