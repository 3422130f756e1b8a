use super::ui;
use crate::core::config::{AppConfig, CategoryConfig};
use crate::core::{CategoryResult, WeightSpec, orchestrator};
use crate::providers::{AdvisorkhojProvider, MoneycontrolProvider};
use crate::store::KeyValueStore;
use anyhow::{Result, bail};
use comfy_table::Cell;
use tracing::warn;

impl CategoryResult {
    pub fn display_as_table(&self, weights: &WeightSpec) -> String {
        let mut output = format!(
            "Category: {}\n\n",
            ui::style_text(&self.category, ui::StyleType::Title)
        );

        if let Some(error) = &self.error {
            output.push_str(&ui::style_text(
                &format!("Ranking failed: {error}"),
                ui::StyleType::Error,
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        let mut header = vec![
            ui::header_cell("Rank"),
            ui::header_cell("Fund"),
            ui::header_cell("Score"),
        ];
        for metric in weights.keys() {
            header.push(ui::header_cell(&metric.to_string()));
        }
        table.set_header(header);

        for fund in &self.funds {
            let mut row = vec![
                ui::rank_cell(fund.rank.unwrap_or(0)),
                Cell::new(&fund.name),
                ui::format_optional_cell(fund.weighted_score, |s| format!("{s:.2}")),
            ];
            for metric in weights.keys() {
                row.push(ui::format_optional_cell(
                    fund.metrics.get(metric).copied(),
                    |v| format!("{v:.2}"),
                ));
            }
            table.add_row(row);
        }

        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("{} funds ranked", self.funds.len()),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub async fn run(config: &AppConfig, category: Option<&str>, refresh: bool) -> Result<()> {
    let selected: Vec<&CategoryConfig> = match category {
        Some(name) => {
            let matched: Vec<_> = config
                .categories
                .iter()
                .filter(|c| c.name.eq_ignore_ascii_case(name))
                .collect();
            if matched.is_empty() {
                bail!("No category named `{name}` in configuration");
            }
            matched
        }
        None => config.categories.iter().collect(),
    };

    let specs = selected
        .iter()
        .map(|c| c.to_spec())
        .collect::<Result<Vec<_>>>()?;

    let store = match config.default_data_path() {
        Ok(path) => KeyValueStore::open(&path.join("cache")),
        Err(e) => {
            warn!(
                "Could not resolve data directory: {}. Caching in memory only.",
                e
            );
            KeyValueStore::in_memory()
        }
    };

    let primary = MoneycontrolProvider::new(config.providers.moneycontrol_base_url(), &store);
    let secondary = AdvisorkhojProvider::new(config.providers.advisorkhoj_base_url(), &store);

    if refresh {
        tokio::join!(primary.clear_cache(), secondary.clear_cache());
    }

    let pb = ui::new_progress_bar(specs.len() as u64, true);
    pb.set_message("Ranking categories...");

    let results = orchestrator::rank_all(&specs, &primary, &secondary, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    // Render in config order; rank_all returns one entry per category
    let num_specs = specs.len();
    for (i, spec) in specs.iter().enumerate() {
        if let Some(result) = results.get(&spec.name) {
            println!("{}", result.display_as_table(&spec.weights));
        }
        if i < num_specs - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}
