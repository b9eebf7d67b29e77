//! Graph session
//!
//! A [`GraphSession`] owns everything one user works with: the context
//! store, the prefix bindings, the configuration and the last routed result.
//! Writes take `&mut self`, so import always completes before a query runs.

use crate::config::{ConfigError, SessionConfig};
use crate::ingest::{
    normalize_table, BuildError, BuildReport, DatasetFetcher, DatasetSchema, FetchError,
    FetchProgress, GraphBuilder, Table, DATASETS,
};
use crate::rdf::{
    ContextStore, NamespaceManager, ParseError, RdfParser, RdfSerializer, SerializeError,
    StoreError,
};
use crate::render::{
    paginate, result_header, HyperlinkRewriter, NavError, NavRequest, NavResponse, NavResult,
    Page, RenderedPage,
};
use crate::sparql::{
    ProjectionHeaders, QueryRewriter, QueryRouter, QueryRows, SparqlResult,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Navigation error: {0}")]
    Nav(#[from] NavError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Why an import path was not usable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportPathError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Cannot derive a context name from {}", .0.display())]
    NoStem(PathBuf),
}

/// Result of importing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub success: bool,
    /// Context the file was loaded into
    pub context: Option<String>,
    /// Triples not already in that context
    pub inserted: usize,
    pub error: Option<ImportPathError>,
}

impl ImportOutcome {
    fn failed(error: ImportPathError) -> Self {
        Self {
            success: false,
            context: None,
            inserted: 0,
            error: Some(error),
        }
    }
}

/// Outcome of downloading and building one dataset
#[derive(Debug)]
pub struct DatasetOutcome {
    pub dataset: &'static str,
    pub result: Result<BuildReport, FetchError>,
}

/// The routed result navigation works on
#[derive(Debug, Clone)]
struct CurrentResult {
    context: Option<String>,
    pages: Vec<Page>,
}

/// A graph session
pub struct GraphSession {
    config: SessionConfig,
    store: ContextStore,
    namespaces: NamespaceManager,
    current: Option<CurrentResult>,
}

impl GraphSession {
    /// Create an empty session
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;

        let store = ContextStore::new(config.context_base())?;
        let mut namespaces = NamespaceManager::new();
        namespaces.bind(config.prefix.clone(), config.namespace.clone());

        Ok(Self {
            config,
            store,
            namespaces,
            current: None,
        })
    }

    /// Load the destination file if it exists and `reinitialize` is false,
    /// otherwise download both datasets and build the graph from scratch.
    pub async fn open(config: SessionConfig, reinitialize: bool) -> SessionResult<Self> {
        let mut session = Self::new(config)?;
        let destination = session.config.destination.clone();

        if destination.exists() && !reinitialize {
            info!("Loading RDF graph from '{}'...", destination.display());
            let outcome = session.import_file(&destination)?;
            if let Some(error) = outcome.error {
                warn!("{}", error);
            }
        } else {
            session.initialize().await?;
        }

        Ok(session)
    }

    /// Download every built-in dataset, rebuild its context and export the
    /// whole store to the destination.
    ///
    /// A dataset whose download fails is skipped; its outcome carries the
    /// error. The saved destination is then merged back in before exporting,
    /// and left untouched when no dataset was rebuilt.
    pub async fn initialize(&mut self) -> SessionResult<Vec<DatasetOutcome>> {
        info!("Initializing RDF graph...");
        let fetcher = DatasetFetcher::new(self.config.http_timeout())?;
        let mut outcomes = Vec::with_capacity(DATASETS.len());

        for schema in DATASETS {
            let url = self.config.dataset_url(schema).to_string();
            let (handle, mut progress) = fetcher.spawn_fetch(url, self.config.dataset_size);

            while let Some(event) = progress.recv().await {
                match event {
                    FetchProgress::Started { available, limit } => {
                        debug!("{}: {} of {} rows requested", schema.name, limit, available)
                    }
                    FetchProgress::Rows(rows) => debug!("{}: {} rows", schema.name, rows),
                    FetchProgress::Finished(rows) => debug!("{}: done, {} rows", schema.name, rows),
                }
            }

            let fetched = match handle.await {
                Ok(result) => result,
                Err(e) => Err(FetchError::Worker(e.to_string())),
            };

            let result = match fetched {
                Ok(mut table) => {
                    self.store.drop_context(schema.name)?;
                    Ok(self.build_dataset(&mut table, schema)?)
                }
                Err(e) => {
                    warn!("Skipping {}: {}", schema.name, e);
                    Err(e)
                }
            };
            outcomes.push(DatasetOutcome {
                dataset: schema.name,
                result,
            });
        }

        let destination = self.config.destination.clone();
        let built = outcomes.iter().filter(|o| o.result.is_ok()).count();
        if built < outcomes.len() && destination.is_file() {
            info!("Keeping saved triples from '{}'", destination.display());
            self.import_file(&destination)?;
        }

        if built == 0 {
            warn!("No dataset was rebuilt; '{}' left as is", destination.display());
        } else {
            self.export(&destination, None)?;
        }
        Ok(outcomes)
    }

    /// Normalize `table` and add it to the dataset's context
    pub fn build_dataset(
        &mut self,
        table: &mut Table,
        schema: &DatasetSchema,
    ) -> SessionResult<BuildReport> {
        normalize_table(table);
        let report = GraphBuilder::new(&mut self.store).build(
            table,
            schema,
            &self.config.namespace,
            schema.name,
        )?;
        Ok(report)
    }

    /// Load an RDF/XML file into the context named after its file stem.
    ///
    /// A missing file is reported in the outcome, not as an error.
    pub fn import_file(&mut self, path: &Path) -> SessionResult<ImportOutcome> {
        if !path.is_file() {
            return Ok(ImportOutcome::failed(ImportPathError::NotFound(path.to_path_buf())));
        }
        let Some(context) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            return Ok(ImportOutcome::failed(ImportPathError::NoStem(path.to_path_buf())));
        };

        let triples = RdfParser::parse_file(path)?;
        let inserted = self.store.extend(&context, &triples)?;
        info!(
            "Imported {} triples ({} new) from '{}' into context '{}'",
            triples.len(),
            inserted,
            path.display(),
            context
        );

        Ok(ImportOutcome {
            success: true,
            context: Some(context),
            inserted,
            error: None,
        })
    }

    /// Write one context, or the union of all contexts, as RDF/XML.
    /// Returns the number of triples written.
    pub fn export(&self, path: &Path, context: Option<&str>) -> SessionResult<usize> {
        info!("Exporting RDF graph to '{}'...", path.display());
        let triples = self.store.triples(context)?;
        RdfSerializer::serialize_file(&triples, path)?;
        Ok(triples.len())
    }

    /// Route a query with the `:` shorthand expanded
    pub fn query(&self, query: &str, context: Option<&str>) -> SparqlResult<QueryRows> {
        QueryRouter::new().route(&self.store, &self.namespaces, query, context)
    }

    /// [`query`](Self::query), with errors logged and replaced by empty rows
    pub fn query_or_empty(&self, query: &str, context: Option<&str>) -> QueryRows {
        QueryRouter::new().route_or_empty(&self.store, &self.namespaces, query, context)
    }

    /// Route a query, make it the current result and render its first page.
    ///
    /// A query that fails to parse or execute gives one header-only page;
    /// [`query`](Self::query) reports the error itself.
    pub fn run_query(&mut self, query: &str, context: Option<&str>) -> SessionResult<RenderedPage> {
        self.run_with(&QueryRouter::new(), query, context)
    }

    fn run_with<R: QueryRewriter>(
        &mut self,
        router: &QueryRouter<R>,
        query: &str,
        context: Option<&str>,
    ) -> SessionResult<RenderedPage> {
        let rows = router.route_or_empty(&self.store, &self.namespaces, query, context);
        let header = result_header(query, &rows, &ProjectionHeaders);
        let pages = paginate(rows.display_rows(), &header, self.config.page_size);
        info!("{} results found", rows.len());

        self.current = Some(CurrentResult {
            context: context.map(str::to_string),
            pages,
        });
        Ok(self.rendered_page(0)?)
    }

    /// Render page `number` of the current result
    pub fn rendered_page(&self, number: usize) -> NavResult<RenderedPage> {
        let current = self.current.as_ref().ok_or(NavError::NoResult)?;
        let page = current.pages.get(number).ok_or(NavError::PageOutOfRange {
            page: number,
            pages: current.pages.len(),
        })?;
        Ok(HyperlinkRewriter::new(&self.namespaces).render(page, current.pages.len()))
    }

    /// Handle a navigation request.
    ///
    /// Pages render as HTML; a followed link routes its query unchanged in
    /// the current result's context. Failures come back as plain text.
    pub fn navigate(&mut self, url: &str) -> NavResponse {
        match self.navigate_inner(url) {
            Ok(page) => NavResponse::html(page.to_html()),
            Err(e) => {
                warn!("Navigation to {} failed: {}", url, e);
                NavResponse::plain(e.to_string())
            }
        }
    }

    fn navigate_inner(&mut self, url: &str) -> SessionResult<RenderedPage> {
        match NavRequest::parse(url)? {
            NavRequest::Page(number) => Ok(self.rendered_page(number)?),
            NavRequest::Query(query) => {
                let context = self.current.as_ref().and_then(|c| c.context.clone());
                self.run_with(&QueryRouter::verbatim(), &query, context.as_deref())
            }
        }
    }

    /// Context of the current result, `None` for the union
    pub fn current_context(&self) -> Option<&str> {
        self.current.as_ref().and_then(|c| c.context.as_deref())
    }

    /// Page count of the current result
    pub fn page_count(&self) -> usize {
        self.current.as_ref().map_or(0, |c| c.pages.len())
    }

    /// Context ids in the store
    pub fn contexts(&self) -> SessionResult<Vec<String>> {
        Ok(self.store.contexts()?)
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
