use std::sync::Arc;

use log::Logger;

use crate::db::Db;
use crate::generation::Generator;
use crate::urls::Urls;

/// Everything a request handler needs, cloned into every filter.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub generator: Arc<Generator>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        generator: Arc<Generator>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            generator,
            config,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Page size of the user listing when the query does not specify one.
    pub(crate) default_page_size: i64,
}

impl Config {
    pub fn new(default_page_size: i64) -> Self {
        Self { default_page_size }
    }
}
