use chrono::{Local, NaiveDate, NaiveDateTime};

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Display,
};

use crate::brl::Brl;
use crate::table::{Sale, Table};

/// Message returned by [`summarize`] when there is nothing to aggregate.
pub const NO_DATA: &str = "Não foi possível gerar o relatório. Verifique os dados.";

/// Message returned by [`summarize_detailed`] when there is nothing to
/// aggregate.
pub const NO_DATA_DETAILED: &str = "Não foi possível gerar o relatório detalhado.";

/// Renders the summary report for `table`.
///
/// Returns the fixed no-data message if no record carries an amount.
#[must_use]
pub fn summarize(table: &Table) -> String {
    match Summary::of(table) {
        Some(summary) => summary.to_string(),
        None => NO_DATA.to_string(),
    }
}

/// Renders the detailed report for `table`, with per-day revenue and the
/// most-sold product.
///
/// Returns the fixed no-data message if no record carries an amount.
#[must_use]
pub fn summarize_detailed(table: &Table) -> String {
    match Detailed::of(table) {
        Some(detailed) => detailed.to_string(),
        None => NO_DATA_DETAILED.to_string(),
    }
}

/// Aggregates for the summary report, computed over the records that carry
/// an amount.
///
/// To get the printable report, use its [`Display`] implementation.
#[derive(Debug)]
pub struct Summary {
    pub generated: NaiveDate,
    pub total: Brl,
    pub count: usize,
    pub average_ticket: Brl,
    pub mean: Brl,
    pub max: Brl,
    pub min: Brl,
    pub latest: Option<NaiveDate>,
    pub customers: usize,
    pub skipped: usize,
}

impl Summary {
    /// Computes the summary aggregates for `table`, stamped with today's
    /// date.
    ///
    /// Returns `None` if no record carries an amount.
    #[must_use]
    pub fn of(table: &Table) -> Option<Self> {
        let valid: Vec<_> = table.valid().collect();
        if valid.is_empty() {
            return None;
        }
        let count = valid.len();
        let mut total = Brl::default();
        for (_, amount) in &valid {
            total += *amount;
        }
        let customers: HashSet<&str> = valid
            .iter()
            .map(|(sale, _)| sale.customer.as_str())
            .collect();
        // Ticket médio and média come out of the same ratio today; the
        // report layout keeps both lines.
        Some(Self {
            generated: Local::now().date_naive(),
            total,
            count,
            average_ticket: total / count,
            mean: total / count,
            max: valid.iter().map(|(_, amount)| *amount).max()?,
            min: valid.iter().map(|(_, amount)| *amount).min()?,
            latest: valid.iter().filter_map(|(sale, _)| sale.date).max(),
            customers: customers.len(),
            skipped: table.len() - count,
        })
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "RELATÓRIO DE VENDAS - {}",
            self.generated.format("%d/%m/%Y")
        )?;
        writeln!(f)?;
        writeln!(f, "RESUMO FINANCEIRO:")?;
        writeln!(f, " - Total vendido: R$ {}", self.total)?;
        writeln!(f, " - Ticket médio: R$ {}", self.average_ticket)?;
        writeln!(f, " - Média de vendas: R$ {}", self.mean)?;
        writeln!(f, " - Maior venda: R$ {}", self.max)?;
        writeln!(f, " - Menor venda: R$ {}", self.min)?;
        writeln!(f)?;
        writeln!(f, "ESTATÍSTICAS:")?;
        writeln!(f, " - Quantidade de vendas: {}", self.count)?;
        writeln!(f, " - Clientes únicos: {}", self.customers)?;
        let latest = self
            .latest
            .map_or_else(|| "N/A".to_string(), |d| d.format("%d/%m/%Y").to_string());
        writeln!(f, " - Data mais recente: {latest}")?;
        writeln!(f)?;
        writeln!(f, "OBSERVAÇÕES:")?;
        writeln!(
            f,
            " - {} venda(s) com valor faltante foram ignoradas",
            self.skipped
        )?;
        writeln!(f, " - Período analisado: Todas as datas disponíveis")
    }
}

/// Aggregates for the detailed report: revenue per day and the most-sold
/// product.
///
/// Records with an amount but no parseable date count towards the totals but
/// belong to no day group.
#[derive(Debug)]
pub struct Detailed {
    pub generated: NaiveDateTime,
    pub by_day: BTreeMap<NaiveDate, Brl>,
    pub top_product: String,
    pub total_records: usize,
    pub valid_records: usize,
}

impl Detailed {
    /// Computes the per-day breakdown for `table`, stamped with the current
    /// local time.
    ///
    /// Returns `None` if no record carries an amount.
    #[must_use]
    pub fn of(table: &Table) -> Option<Self> {
        let valid: Vec<_> = table.valid().collect();
        if valid.is_empty() {
            return None;
        }
        let mut by_day: BTreeMap<NaiveDate, Brl> = BTreeMap::new();
        for (sale, amount) in &valid {
            if let Some(day) = sale.date {
                *by_day.entry(day).or_default() += *amount;
            }
        }
        Some(Self {
            generated: Local::now().naive_local(),
            by_day,
            top_product: top_product(&valid)?.to_string(),
            total_records: table.len(),
            valid_records: valid.len(),
        })
    }
}

/// Returns the most frequent product among `valid`, ties broken by the first
/// product in row order to reach the winning count.
fn top_product<'a>(valid: &[(&'a Sale, Brl)]) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (sale, _) in valid {
        *counts.entry(sale.product.as_str()).or_default() += 1;
    }
    let mut best: Option<(&str, usize)> = None;
    for (sale, _) in valid {
        let count = counts[sale.product.as_str()];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((sale.product.as_str(), count));
        }
    }
    best.map(|(product, _)| product)
}

impl Display for Detailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            " RELATÓRIO DETALHADO - {}",
            self.generated.format("%d/%m/%Y %H:%M")
        )?;
        writeln!(f)?;
        writeln!(f, "Vendas por dia:")?;
        for (day, total) in &self.by_day {
            writeln!(f, "   • {}: R$ {total}", day.format("%d/%m"))?;
        }
        writeln!(f)?;
        writeln!(f, " DESTAQUES:")?;
        writeln!(f, "   • Produto mais vendido: {}", self.top_product)?;
        writeln!(
            f,
            "   • Total de registros analisados: {} (válidos: {})",
            self.total_records, self.valid_records
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(date: Option<&str>, amount: Option<&str>, customer: &str, product: &str) -> Sale {
        Sale {
            date: date.map(|d| d.parse().unwrap()),
            amount: amount.map(|a| a.parse().unwrap()),
            customer: customer.to_string(),
            product: product.to_string(),
        }
    }

    fn scenario_table() -> Table {
        Table::from(vec![
            sale(Some("2025-01-01"), Some("100"), "x", "p1"),
            sale(Some("2025-01-01"), Some("200"), "y", "p1"),
            sale(Some("2025-01-02"), None, "z", "p2"),
        ])
    }

    #[test]
    fn summary_of_fn_computes_scenario_aggregates() {
        let summary = Summary::of(&scenario_table()).unwrap();
        assert_eq!(summary.total, "300".parse().unwrap());
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_ticket, "150".parse().unwrap());
        assert_eq!(summary.mean, summary.average_ticket);
        assert_eq!(summary.max, "200".parse().unwrap());
        assert_eq!(summary.min, "100".parse().unwrap());
        assert_eq!(summary.customers, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.latest, "2025-01-01".parse().ok());
    }

    #[test]
    fn summary_render_has_fixed_structure_and_currency_format() {
        let rendered = summarize(&scenario_table());
        assert!(rendered.contains(" - Total vendido: R$ 300.00"), "{rendered}");
        assert!(rendered.contains(" - Ticket médio: R$ 150.00"), "{rendered}");
        assert!(rendered.contains(" - Média de vendas: R$ 150.00"), "{rendered}");
        assert!(rendered.contains(" - Maior venda: R$ 200.00"), "{rendered}");
        assert!(rendered.contains(" - Menor venda: R$ 100.00"), "{rendered}");
        assert!(rendered.contains(" - Quantidade de vendas: 2"), "{rendered}");
        assert!(rendered.contains(" - Clientes únicos: 2"), "{rendered}");
        assert!(
            rendered.contains(" - Data mais recente: 01/01/2025"),
            "{rendered}"
        );
        assert!(
            rendered.contains(" - 1 venda(s) com valor faltante foram ignoradas"),
            "{rendered}"
        );
    }

    #[test]
    fn summary_reports_na_when_no_valid_record_has_a_date() {
        let table = Table::from(vec![sale(None, Some("100"), "x", "p1")]);
        let rendered = summarize(&table);
        assert!(rendered.contains(" - Data mais recente: N/A"), "{rendered}");
    }

    #[test]
    fn detailed_of_fn_groups_by_day_in_ascending_order() {
        let table = Table::from(vec![
            sale(Some("2025-01-02"), Some("50"), "x", "p1"),
            sale(Some("2025-01-01"), Some("100"), "x", "p1"),
            sale(Some("2025-01-01"), Some("200"), "y", "p1"),
        ]);
        let detailed = Detailed::of(&table).unwrap();
        let days: Vec<NaiveDate> = detailed.by_day.keys().copied().collect();
        assert_eq!(
            days,
            vec!["2025-01-01".parse().unwrap(), "2025-01-02".parse().unwrap()]
        );
        assert_eq!(detailed.by_day[&days[0]], "300".parse().unwrap());
        assert_eq!(detailed.by_day[&days[1]], "50".parse().unwrap());
    }

    #[test]
    fn detailed_render_matches_scenario() {
        let rendered = summarize_detailed(&scenario_table());
        assert!(rendered.contains("   • 01/01: R$ 300.00"), "{rendered}");
        assert!(
            rendered.contains("   • Produto mais vendido: p1"),
            "{rendered}"
        );
        assert!(
            rendered.contains("   • Total de registros analisados: 3 (válidos: 2)"),
            "{rendered}"
        );
    }

    #[test]
    fn per_day_totals_sum_to_summary_total() {
        let table = Table::load("testdata/vendas_datadas.csv").unwrap();
        let summary = Summary::of(&table).unwrap();
        let detailed = Detailed::of(&table).unwrap();
        let mut sum = Brl::default();
        for total in detailed.by_day.values() {
            sum += *total;
        }
        assert_eq!(sum, summary.total);
    }

    #[test]
    fn valid_sale_without_date_counts_in_totals_but_no_day_group() {
        let table = Table::from(vec![
            sale(Some("2025-01-01"), Some("100"), "x", "p1"),
            sale(None, Some("50"), "y", "p2"),
        ]);
        let detailed = Detailed::of(&table).unwrap();
        assert_eq!(detailed.valid_records, 2);
        assert_eq!(detailed.by_day.len(), 1);
        let summary = Summary::of(&table).unwrap();
        assert_eq!(summary.total, "150".parse().unwrap());
    }

    #[test]
    fn ticket_times_count_stays_within_rounding_tolerance_of_total() {
        let table = Table::from(vec![
            sale(Some("2025-01-01"), Some("100"), "x", "p1"),
            sale(Some("2025-01-01"), Some("125"), "y", "p1"),
            sale(Some("2025-01-02"), Some("125"), "z", "p2"),
        ]);
        let summary = Summary::of(&table).unwrap();
        let product = summary.average_ticket.cents() * summary.count as i64;
        let diff = (product - summary.total.cents()).abs();
        assert!(diff <= summary.count as i64, "off by {diff} centavos");
    }

    #[test]
    fn excluded_count_is_total_minus_valid() {
        let table = Table::load("testdata/vendas.csv").unwrap();
        let summary = Summary::of(&table).unwrap();
        assert_eq!(summary.skipped, table.len() - summary.count);
        assert_eq!(summary.skipped, 3);
    }

    #[test]
    fn summarize_is_idempotent_modulo_timestamp() {
        let table = scenario_table();
        let strip = |s: String| s.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert_eq!(strip(summarize(&table)), strip(summarize(&table)));
        assert_eq!(
            strip(summarize_detailed(&table)),
            strip(summarize_detailed(&table))
        );
    }

    #[test]
    fn empty_table_yields_no_data_messages() {
        let table = Table::default();
        assert_eq!(summarize(&table), NO_DATA);
        assert_eq!(summarize_detailed(&table), NO_DATA_DETAILED);
    }

    #[test]
    fn all_null_amounts_yield_no_data_messages() {
        let table = Table::from(vec![
            sale(Some("2025-01-01"), None, "x", "p1"),
            sale(Some("2025-01-02"), None, "y", "p2"),
        ]);
        assert_eq!(summarize(&table), NO_DATA);
        assert_eq!(summarize_detailed(&table), NO_DATA_DETAILED);
    }

    #[test]
    fn top_product_tie_breaks_on_first_occurrence() {
        let products = |names: &[&str]| {
            Table::from(
                names
                    .iter()
                    .map(|&p| sale(Some("2025-01-01"), Some("10"), "x", p))
                    .collect::<Vec<_>>(),
            )
        };
        let detailed = Detailed::of(&products(&["A", "B", "A", "B"])).unwrap();
        assert_eq!(detailed.top_product, "A");
        let detailed = Detailed::of(&products(&["B", "A", "A", "B"])).unwrap();
        assert_eq!(detailed.top_product, "B");
    }

    #[test]
    fn top_product_prefers_strictly_higher_counts() {
        let table = Table::from(vec![
            sale(Some("2025-01-01"), Some("10"), "x", "A"),
            sale(Some("2025-01-01"), Some("10"), "x", "B"),
            sale(Some("2025-01-01"), Some("10"), "x", "B"),
        ]);
        assert_eq!(Detailed::of(&table).unwrap().top_product, "B");
    }
}
