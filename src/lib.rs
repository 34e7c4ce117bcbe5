/*!
# Component Miner

Duplicate-structure detection and component synthesis for large
block-structured markup documents (HTML, JSX, Vue or Handlebars-style
templates with embedded expressions).

Given one document, the miner finds recurring element subtrees that are equal
up to literal values, groups them by a structural signature and proposes a
parameterized component for each group, together with a position-indexed
occurrence map that says where each component would replace the original
blocks and with which arguments. The document itself is never modified.

## Architecture

```text
Component Miner
├── Scanner     - string-aware region lexer, tag events
├── Blocks      - balanced block extraction with recovery diagnostics
├── Normalizer  - canonical form + SHA-256 signature
├── Cluster     - grouping by signature, thresholds, ranking
├── Analyzer    - slot identifiers, role hints, extraction engine
├── Synthesis   - naming, parameters, occurrence map
├── Reports     - text and JSON output
└── Config      - thresholds and vocabularies (TOML/YAML)
```

## Usage

### CLI
```bash
component-miner extract page.jsx --min-block-lines 6 --format json --output report.json
component-miner init-config --output component-miner.toml
```

### Library
```rust,ignore
use component_miner::{extract_components, ExtractorConfig};

let report = extract_components(&text, &ExtractorConfig::default())?;
for component in &report.components {
    println!("{} x{}", component.name, component.occurrence_count);
}
```
*/

pub mod analyzer;
pub mod blocks;
pub mod cli_common;
pub mod cluster;
pub mod config;
pub mod core;
pub mod normalizer;
pub mod reports;
pub mod scanner;
pub mod synthesis;

pub use analyzer::{
    ExtractionEngine, ExtractionReport, ExtractionStats, RoleHint, Variable, VariableAnalyzer,
};
pub use blocks::{Block, BlockExtractor};
pub use cluster::{Cluster, ClusterIndex};
pub use config::ExtractorConfig;
pub use core::{ConfigError, Diagnostic, DiagnosticKind, Position};
pub use normalizer::{Normalizer, Signature};
pub use reports::{ReportConfig, ReportFormat, ReportManager};
pub use scanner::{Event, EventKind, Scanner};
pub use synthesis::{Component, ComponentSynthesizer, OccurrenceEntry};

/// Runs one document through the whole pipeline.
pub fn extract_components(
    text: &str,
    config: &ExtractorConfig,
) -> Result<ExtractionReport, ConfigError> {
    let engine = ExtractionEngine::new(config.clone())?;
    Ok(engine.extract(text))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
