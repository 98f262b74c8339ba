use std::fs;
use std::path::Path;

use anyhow::Context;
use console::style;
use tracing::{debug, info};

use bbdoc::{LookupProvider, MarkupRenderer, NullLookup};
use bbdoc_parser::{BbParser, Element};

use crate::config::ProjectConfig;
use crate::titles::TitleCatalog;

/// What a pipeline run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Html,
    Meta,
    /// The parsed tree as JSON.
    Tree,
}

/// Parses markup and renders it with a fixed configuration and title source.
pub struct Pipeline {
    config: ProjectConfig,
    renderer: MarkupRenderer,
    lookup: Box<dyn LookupProvider>,
}

pub fn print_err<T>(res: anyhow::Result<T>) -> Option<T> {
    match res {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            e.chain()
                .skip(1)
                .for_each(|cause| eprintln!(" {} {}", style("caused by:").bold(), cause));
            None
        }
    }
}

impl Pipeline {
    /// Uses the configured title catalog, or finds no titles when none is configured.
    pub fn new(config: ProjectConfig) -> anyhow::Result<Self> {
        let lookup: Box<dyn LookupProvider> = match &config.titles {
            Some(path) => {
                info!(path = %path.display(), "loading title catalog");
                Box::new(TitleCatalog::load(path)?)
            }
            None => Box::new(NullLookup),
        };
        Ok(Self::with_lookup(config, lookup))
    }

    pub fn with_lookup(config: ProjectConfig, lookup: Box<dyn LookupProvider>) -> Self {
        let renderer = MarkupRenderer::new(config.render.clone());
        Pipeline {
            config,
            renderer,
            lookup,
        }
    }

    pub fn parse(&self, markup: &str) -> Element {
        BbParser::new(markup, self.config.parser).parse()
    }

    pub async fn html(&self, markup: &str) -> anyhow::Result<String> {
        let doc = self.parse(markup);
        self.renderer
            .render_html(&doc, self.lookup.as_ref())
            .await
            .context("Internal error while rendering html")
    }

    pub async fn meta(&self, markup: &str) -> String {
        let doc = self.parse(markup);
        self.renderer
            .meta_description(&doc, self.lookup.as_ref())
            .await
    }

    pub fn tree(&self, markup: &str) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.parse(markup))?)
    }

    pub async fn render(&self, kind: OutputKind, markup: &str) -> anyhow::Result<String> {
        match kind {
            OutputKind::Html => self.html(markup).await,
            OutputKind::Meta => Ok(self.meta(markup).await),
            OutputKind::Tree => self.tree(markup),
        }
    }

    /// Renders `input` and writes the result to `output`, or stdout when no output is given.
    pub async fn run(
        &self,
        kind: OutputKind,
        input: &Path,
        output: Option<&Path>,
    ) -> anyhow::Result<()> {
        let markup = fs::read_to_string(input)
            .with_context(|| format!("Error loading document {}", input.display()))?;
        debug!(input = %input.display(), ?kind, bytes = markup.len(), "rendering");

        let rendered = self
            .render(kind, &markup)
            .await
            .with_context(|| format!("Could not render {}", input.display()))?;

        match output {
            Some(path) => {
                fs::write(path, rendered)
                    .with_context(|| format!("Could not write {}", path.display()))?;
                eprintln!("{} {}", style("Wrote").green().bold(), path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}
