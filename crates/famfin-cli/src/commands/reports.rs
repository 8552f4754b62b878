//! Report command implementations

use anyhow::{bail, Context, Result};
use famfin_core::db::Database;
use famfin_core::import::parse_number;
use famfin_core::reports::{self, Filter, Summary};
use famfin_core::{Config, Transaction};

use super::transactions::parse_month_arg;
use super::{format_amount, truncate};

/// Parse `CATEGORY=AMOUNT` budget overrides
pub fn parse_budget_overrides(overrides: &[String]) -> Result<Vec<(String, f64)>> {
    overrides
        .iter()
        .map(|entry| {
            let Some((category, amount)) = entry.rsplit_once('=') else {
                bail!("Invalid budget '{}' (use CATEGORY=AMOUNT)", entry);
            };
            let amount = parse_number(amount)
                .with_context(|| format!("Invalid budget amount in '{}'", entry))?;
            Ok((category.trim().to_string(), amount))
        })
        .collect()
}

pub fn cmd_summary(
    db: &Database,
    config: &Config,
    month: Option<&str>,
    category: Option<&str>,
    search: Option<&str>,
    budget_overrides: &[String],
    json: bool,
) -> Result<()> {
    let mut config = config.clone();
    for (category, amount) in parse_budget_overrides(budget_overrides)? {
        config.budgets.insert(category, amount);
    }

    let transactions: Vec<Transaction> = db
        .list_transactions(None)?
        .into_iter()
        .map(Transaction::from)
        .collect();

    let month = match parse_month_arg(month)? {
        Some(m) => Some(m),
        None => reports::latest_month(&transactions),
    };
    let filter = Filter::new().month(month).category(category).search(search);
    let summary = reports::summarize(&transactions, &filter, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!();
    match summary.month {
        Some(m) => println!("📊 Summary for {}", m),
        None => println!("📊 Summary (no transactions yet)"),
    }
    println!("   ─────────────────────────────────────────────");
    println!("   Transactions: {}", summary.transaction_count);
    println!("   Income:       {:>14}", format_amount(summary.totals.income));
    println!("   Expenses:     {:>14}", format_amount(summary.totals.expenses));
    println!("   Net:          {:>14}", format_amount(summary.totals.net));

    if let Some(cmp) = &summary.comparison {
        println!();
        println!("   📈 Compared to");
        println!(
            "   {} (expenses): {:>14}",
            cmp.previous_month,
            format_amount(cmp.month_over_month)
        );
        println!(
            "   {} (expenses): {:>14}",
            cmp.previous_year,
            format_amount(cmp.year_over_year)
        );
        println!("   Net change:         {:>14}", format_amount(cmp.net_change));
    }

    if let Some(insights) = &summary.insights {
        println!();
        println!("   💡 Insights");
        if let Some(tx) = &insights.largest_expense {
            println!(
                "   Largest expense: {} {} ({})",
                format_amount(tx.amount),
                truncate(&tx.description, 30),
                tx.date
            );
        }
        if let Some(tx) = &insights.largest_income {
            println!(
                "   Largest income:  {} {} ({})",
                format_amount(tx.amount),
                truncate(&tx.description, 30),
                tx.date
            );
        }
        if let Some(top) = &insights.top_category {
            println!(
                "   Top category:    {} ({})",
                top.category,
                format_amount(top.total)
            );
        }
        println!(
            "   Avg daily spend: {}",
            format_amount(insights.average_daily_spend)
        );
    }

    if !summary.category_totals.is_empty() {
        println!();
        println!("   📂 By category");
        for (category, total) in &summary.category_totals {
            println!("   {:<24} {:>14}", category, format_amount(*total));
        }
    }

    let budgeted: Vec<_> = summary
        .budgets
        .iter()
        .filter_map(|b| b.budget.map(|budget| (b, budget)))
        .collect();
    if !budgeted.is_empty() {
        println!();
        println!("   🎯 Budgets");
        for (status, budget) in budgeted {
            let filled = (status.percent / 10.0).round() as usize;
            println!(
                "   {:<24} [{}{}] {:>3.0}%  {} / {}",
                status.category,
                "█".repeat(filled),
                "░".repeat(10 - filled.min(10)),
                status.percent,
                format_amount(status.spent.abs()),
                format_amount(budget)
            );
        }
    }
}
