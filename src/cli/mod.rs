use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::notify::Notifier;
use crate::application::params::{
    parse_category_param, parse_date_param, parse_limit_param, parse_period_param,
    parse_type_param,
};
use crate::application::reporting::{
    MonthlyEmailReport, SavingSuggestions, SuggestionCatalog, TrendData,
};
use crate::application::{
    BudgetDraft, NewTransaction, TrackerService, TransactionFilter,
};
use crate::domain::{format_amount, parse_amount, Category, Cents, DEFAULT_THRESHOLD};
use crate::io::export::CsvLayout;

/// FinTrackr - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "fintrackr")]
#[command(about = "Track income and expenses, set budgets, and get reports and alerts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "fintrackr.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Record a transaction
    Add {
        /// Amount (e.g., "42.50" or "42")
        amount: String,

        /// Owner's email
        #[arg(long)]
        user: String,

        /// Transaction type: income, expense
        #[arg(short = 't', long = "type")]
        kind: String,

        /// Category (e.g., "food", "salary")
        #[arg(short, long)]
        category: String,

        /// Description of the transaction
        #[arg(short, long)]
        description: Option<String>,

        /// Date of the transaction (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List recent transactions
    Transactions {
        /// Owner's email
        #[arg(long)]
        user: String,

        /// Filter by type: income, expense
        #[arg(long = "type")]
        kind: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Generate reports and analytics
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export transactions to CSV
    Export {
        /// Owner's email
        #[arg(long)]
        user: String,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Column layout: display, report
        #[arg(long, default_value = "display")]
        layout: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check all budget thresholds and dispatch alerts (scheduler entry point)
    CheckThresholds,

    /// Generate and dispatch monthly reports for all users (scheduler entry point)
    SendReports,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Display name
        name: String,

        /// Email address (must be unique)
        email: String,
    },

    /// List all users
    List,
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget, or replace the existing one for the category
    Set {
        /// Expense category to cap
        category: String,

        /// Owner's email
        #[arg(long)]
        user: String,

        /// Budget amount (e.g., "400" or "400.00")
        #[arg(short, long)]
        amount: String,

        /// Period: weekly, monthly, yearly
        #[arg(short, long, default_value = "monthly")]
        period: String,

        /// Alert threshold as a percentage of the amount
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// Disable threshold alerts for this budget
        #[arg(long)]
        no_notifications: bool,
    },

    /// List budgets with current consumption
    List {
        /// Owner's email
        #[arg(long)]
        user: String,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: String,

        /// Owner's email
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly summary: totals and category breakdowns
    Summary {
        /// Owner's email
        #[arg(long)]
        user: String,

        /// Year (defaults to current)
        #[arg(long)]
        year: Option<String>,

        /// Month 1-12 (defaults to current)
        #[arg(long)]
        month: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Monthly spending totals over the trailing months
    Trends {
        /// Owner's email
        #[arg(long)]
        user: String,

        /// Number of trailing months
        #[arg(long)]
        months: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Saving suggestions for the top spending categories
    Suggestions {
        /// Owner's email
        #[arg(long)]
        user: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                TrackerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::User(user_cmd) => {
                let service = TrackerService::connect(&self.database).await?;
                run_user_command(&service, user_cmd).await?;
            }

            Commands::Add {
                amount,
                user,
                kind,
                category,
                description,
                date,
            } => {
                let service = TrackerService::connect(&self.database).await?;
                let owner = service.get_user_by_email(&user).await?;

                let amount_cents =
                    parse_amount(&amount).context("Invalid amount format. Use '42.50' or '42'")?;
                let kind = parse_type_param(&kind)?;
                let category = parse_category_param(&category)?;
                let date = date.as_deref().map(parse_date_param).transpose()?;

                let tx = service
                    .add_transaction(
                        owner.id,
                        NewTransaction {
                            amount_cents,
                            kind,
                            category,
                            description,
                            date,
                        },
                    )
                    .await?;

                println!(
                    "Recorded {}: {} {} ({})",
                    tx.kind,
                    format_amount(tx.amount_cents),
                    tx.category,
                    tx.id
                );
            }

            Commands::Transactions {
                user,
                kind,
                category,
                from,
                to,
                limit,
            } => {
                let service = TrackerService::connect(&self.database).await?;
                let owner = service.get_user_by_email(&user).await?;

                let filter = TransactionFilter {
                    kind: kind.as_deref().map(parse_type_param).transpose()?,
                    category: category.as_deref().map(parse_category_param).transpose()?,
                    start: from.as_deref().map(parse_date_param).transpose()?,
                    end: to.as_deref().map(parse_date_param).transpose()?,
                    limit: limit.as_deref().map(parse_limit_param).transpose()?,
                };

                let transactions = service.list_transactions(owner.id, filter).await?;
                if transactions.is_empty() {
                    println!("No transactions found.");
                } else {
                    println!(
                        "{:<12} {:<8} {:<15} {:>12}  {}",
                        "DATE", "TYPE", "CATEGORY", "AMOUNT", "DESCRIPTION"
                    );
                    println!("{}", "-".repeat(70));
                    for tx in transactions {
                        println!(
                            "{:<12} {:<8} {:<15} {:>12}  {}",
                            tx.date.format("%Y-%m-%d"),
                            tx.kind,
                            tx.category,
                            format_amount(tx.amount_cents),
                            tx.description.as_deref().unwrap_or("")
                        );
                    }
                }
            }

            Commands::Budget(budget_cmd) => {
                let service = TrackerService::connect(&self.database).await?;
                run_budget_command(&service, budget_cmd).await?;
            }

            Commands::Report(report_cmd) => {
                let service = TrackerService::connect(&self.database).await?;
                run_report_command(&service, report_cmd).await?;
            }

            Commands::Export {
                user,
                from,
                to,
                layout,
                output,
            } => {
                let service = TrackerService::connect(&self.database).await?;
                let owner = service.get_user_by_email(&user).await?;

                let layout = CsvLayout::from_str(&layout).ok_or_else(|| {
                    anyhow::anyhow!("Invalid layout '{}'. Valid layouts: display, report", layout)
                })?;

                let csv = service
                    .export_transactions_csv(owner.id, from.as_deref(), to.as_deref(), layout)
                    .await?;

                match output {
                    Some(path) => {
                        std::fs::write(&path, &csv)
                            .with_context(|| format!("Failed to write {}", path))?;
                        println!("Exported to {}", path);
                    }
                    None => print!("{csv}"),
                }
            }

            Commands::CheckThresholds => {
                let service = TrackerService::connect(&self.database).await?;
                let alerts = service
                    .check_budget_thresholds(&ConsoleNotifier, Utc::now())
                    .await?;
                println!("Dispatched {} budget alert(s).", alerts.len());
            }

            Commands::SendReports => {
                let service = TrackerService::connect(&self.database).await?;
                let reported = service
                    .send_monthly_reports(&ConsoleNotifier, Utc::now())
                    .await?;
                println!("Dispatched {} monthly report(s).", reported.len());
            }
        }

        Ok(())
    }
}

async fn run_user_command(service: &TrackerService, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Add { name, email } => {
            let user = service.create_user(name, email).await?;
            println!("Created user: {} <{}>", user.name, user.email);
        }

        UserCommands::List => {
            let users = service.list_users().await?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                for user in users {
                    println!("{} <{}>", user.name, user.email);
                }
            }
        }
    }

    Ok(())
}

async fn run_budget_command(service: &TrackerService, cmd: BudgetCommands) -> Result<()> {
    match cmd {
        BudgetCommands::Set {
            category,
            user,
            amount,
            period,
            threshold,
            no_notifications,
        } => {
            let owner = service.get_user_by_email(&user).await?;
            let amount_cents =
                parse_amount(&amount).context("Invalid amount format. Use '400.00' or '400'")?;
            let category = parse_category_param(&category)?;
            let period = parse_period_param(&period)?;

            let budget = service
                .upsert_budget(
                    owner.id,
                    BudgetDraft {
                        category,
                        amount_cents,
                        period,
                        notifications: !no_notifications,
                        threshold,
                    },
                )
                .await?;

            println!(
                "Set budget: {} {} per {} (alerts at {}%)",
                budget.category,
                format_amount(budget.amount_cents),
                budget.period,
                budget.threshold
            );
        }

        BudgetCommands::List { user } => {
            let owner = service.get_user_by_email(&user).await?;
            let statuses = service.budgets_with_progress(owner.id, Utc::now()).await?;
            if statuses.is_empty() {
                println!("No budgets found.");
            } else {
                println!(
                    "{:<15} {:<10} {:>12} {:>12} {:>12} {:>8}",
                    "CATEGORY", "PERIOD", "LIMIT", "SPENT", "REMAINING", "USED"
                );
                println!("{}", "-".repeat(75));
                for status in statuses {
                    println!(
                        "{:<15} {:<10} {:>12} {:>12} {:>12} {:>7.2}%",
                        status.budget.category.as_str(),
                        status.budget.period,
                        format_amount(status.budget.amount_cents),
                        format_amount(status.progress.spent),
                        format_amount(status.progress.remaining),
                        status.progress.percentage,
                    );
                }
            }
        }

        BudgetCommands::Delete { id, user } => {
            let owner = service.get_user_by_email(&user).await?;
            let budget_id =
                Uuid::parse_str(&id).context("Invalid budget ID format (expected UUID)")?;
            service.delete_budget(owner.id, budget_id).await?;
            println!("Deleted budget: {}", id);
        }
    }

    Ok(())
}

async fn run_report_command(service: &TrackerService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Summary {
            user,
            year,
            month,
            format,
        } => {
            let owner = service.get_user_by_email(&user).await?;
            let summary = service
                .monthly_summary(owner.id, year.as_deref(), month.as_deref(), Utc::now())
                .await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!(
                "Summary {} to {}",
                summary.start_date.format("%Y-%m-%d"),
                summary.end_date.format("%Y-%m-%d")
            );
            println!();
            println!("  Income:   {:>12}", format_amount(summary.totals.income));
            println!("  Expenses: {:>12}", format_amount(summary.totals.expense));
            println!(
                "  Net:      {:>12}",
                format_amount(summary.totals.income - summary.totals.expense)
            );

            if !summary.expenses_by_category.is_empty() {
                println!();
                println!("Expenses by category:");
                for bucket in &summary.expenses_by_category {
                    println!("  {:<15} {:>12}", bucket.key, format_amount(bucket.total));
                }
            }
            if !summary.income_by_category.is_empty() {
                println!();
                println!("Income by category:");
                for bucket in &summary.income_by_category {
                    println!("  {:<15} {:>12}", bucket.key, format_amount(bucket.total));
                }
            }
        }

        ReportCommands::Trends {
            user,
            months,
            format,
        } => {
            let owner = service.get_user_by_email(&user).await?;
            let trend = service
                .spending_trends(owner.id, months.as_deref(), Utc::now())
                .await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&trend)?);
                return Ok(());
            }

            match &trend.trends {
                TrendData::NoData(message) => println!("{message}"),
                TrendData::Series(points) => {
                    println!("{:<10} {:>12} {:>8}", "PERIOD", "SPENT", "COUNT");
                    println!("{}", "-".repeat(32));
                    for point in points {
                        println!(
                            "{:<10} {:>12} {:>8}",
                            point.period,
                            format_amount(point.total),
                            point.count
                        );
                    }
                }
            }
        }

        ReportCommands::Suggestions { user, format } => {
            let owner = service.get_user_by_email(&user).await?;
            let suggestions = service
                .saving_suggestions(owner.id, &SuggestionCatalog::default(), Utc::now())
                .await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
                return Ok(());
            }

            match &suggestions {
                SavingSuggestions::NoData {
                    message,
                    default_suggestions,
                } => {
                    println!("{message}");
                    for suggestion in default_suggestions {
                        println!(
                            "  {}: {} (potential savings {})",
                            suggestion.category,
                            suggestion.suggestion,
                            format_amount(suggestion.potential_savings)
                        );
                    }
                }
                SavingSuggestions::Ranked(entries) => {
                    for entry in entries {
                        println!(
                            "{}: spent {} over {} ({} transactions)",
                            entry.category,
                            format_amount(entry.total_spent),
                            entry.timeframe,
                            entry.transaction_count
                        );
                        println!(
                            "  {} (potential savings {})",
                            entry.suggestion,
                            format_amount(entry.potential_savings)
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Notifier that prints alert and report content to stdout, standing in for
/// the external mail transport.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    async fn budget_alert(
        &self,
        email: &str,
        category: Category,
        percentage: f64,
        budget_amount: Cents,
        spent: Cents,
    ) -> Result<()> {
        println!("Budget Alert -> {email}");
        println!(
            "  You've spent {:.2}% of your {} budget ({} of {})",
            percentage,
            category,
            format_amount(spent),
            format_amount(budget_amount)
        );
        Ok(())
    }

    async fn monthly_report(
        &self,
        email: &str,
        name: &str,
        report: &MonthlyEmailReport,
        csv: &str,
    ) -> Result<()> {
        println!("Monthly Report -> {name} <{email}>");
        println!("  Income:   {}", format_amount(report.total_income));
        println!("  Expenses: {}", format_amount(report.total_expenses));
        println!("  Savings:  {}", format_amount(report.net_savings));
        for expense in &report.top_expenses {
            println!("  Top expense {}: {}", expense.category, format_amount(expense.amount));
        }
        for budget in &report.budgets {
            println!(
                "  Budget {}: {} of {} ({:.2}%)",
                budget.category,
                format_amount(budget.spent),
                format_amount(budget.budget_amount),
                budget.percentage
            );
        }
        println!("  Attachment: {} CSV line(s)", csv.lines().count());
        Ok(())
    }
}
