use crate::model::Repository;
use crate::storage::DbStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct RepositoryRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Repository")]
    name: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Chunks")]
    chunks: usize,
    #[tabled(rename = "Edges")]
    edges: usize,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Repositories", &stats.repositories.to_string());
    builder.add_row("Files", &stats.files.to_string());
    builder.add_row("Chunks", &stats.chunks.to_string());
    builder.add_row("Dependencies", &stats.dependencies.to_string());
    builder.build()
}

/// One row per repository with its own counts
pub fn repositories_table(repos: &[(Repository, DbStats)]) -> String {
    if repos.is_empty() {
        return String::new();
    }

    let rows: Vec<RepositoryRow> = repos
        .iter()
        .map(|(repo, stats)| RepositoryRow {
            id: repo.id.to_string(),
            name: repo.display_name(),
            files: stats.files,
            chunks: stats.chunks,
            edges: stats.dependencies,
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_table_lists_counts() {
        let stats = DbStats { repositories: 1, files: 12, chunks: 40, dependencies: 7 };
        let table = stats_table(&stats);

        assert!(table.contains("Metric"));
        assert!(table.contains("Dependencies"));
        assert!(table.contains("40"));
    }

    #[test]
    fn test_repositories_table() {
        let repo = Repository::new("acme", "shop", "main", None);
        let table = repositories_table(&[(repo.clone(), DbStats::default())]);

        assert!(table.contains("acme/shop@main"));
        assert!(table.contains(&repo.id.to_string()));
        assert!(repositories_table(&[]).is_empty());
    }
}
