use chrono::NaiveDate;
use clap::{Arg, ArgMatches, Command};
use std::process;

use spendwise::aggregate::format_amount;
use spendwise::prelude::*;

fn credentials_args(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("EMAIL")
                .env("SPENDWISE_EMAIL")
                .help("Account email")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("password")
                .short('p')
                .long("password")
                .value_name("PASSWORD")
                .env("SPENDWISE_PASSWORD")
                .hide_env_values(true)
                .help("Account password")
                .takes_value(true)
                .required(true),
        )
}

/// Fields of the transaction form, shared by `add` and `update`
fn entry_args(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("amount")
                .long("amount")
                .takes_value(true)
                .allow_hyphen_values(true)
                .required(true),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("ID")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .value_name("YYYY-MM-DD")
                .takes_value(true),
        )
        .arg(Arg::new("description").long("description").takes_value(true))
}

fn cli() -> Command<'static> {
    Command::new("spendwise")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Monthly expense summaries from a Supabase project")
        .subcommand_required(true)
        .subcommand(
            credentials_args(Command::new("summary"))
                .about("Print category totals and transactions for a month")
                .arg(
                    Arg::new("month")
                        .short('m')
                        .long("month")
                        .value_name("YYYY-MM")
                        .help("Month to show, defaults to the current one")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("palette")
                        .long("palette")
                        .value_name("hue|fixed")
                        .help("Chart colour strategy")
                        .takes_value(true)
                        .default_value("hue"),
                )
                .arg(
                    Arg::new("previous")
                        .long("previous")
                        .help("Show the month before --month")
                        .conflicts_with("next"),
                )
                .arg(
                    Arg::new("next")
                        .long("next")
                        .help("Show the month after --month"),
                ),
        )
        .subcommand(entry_args(credentials_args(Command::new("add"))).about("Record an expense"))
        .subcommand(
            entry_args(credentials_args(Command::new("update")))
                .about("Overwrite an existing transaction")
                .arg(Arg::new("id").required(true).takes_value(true)),
        )
        .subcommand(
            credentials_args(Command::new("delete"))
                .about("Delete a transaction")
                .arg(Arg::new("id").required(true).takes_value(true)),
        )
        .subcommand(credentials_args(Command::new("categories")).about("List categories"))
}

fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .map_err(|e| Error::validation("month", e))
}

/// The month `summary` shows after applying `--previous` / `--next`
fn summary_month(matches: &ArgMatches) -> Result<MonthWindow> {
    let reference = match matches.value_of("month") {
        Some(value) => parse_month(value)?,
        None => spendwise::sync::today(),
    };
    let window = MonthWindow::containing(reference);
    Ok(if matches.is_present("previous") {
        window.previous()
    } else if matches.is_present("next") {
        window.next()
    } else {
        window
    })
}

fn entry_input(matches: &ArgMatches) -> Result<TransactionInput> {
    let amount = matches
        .value_of("amount")
        .unwrap_or_default()
        .parse::<f64>()
        .map_err(|e| Error::validation("amount", e))?;
    let mut input = TransactionInput::new(amount, matches.value_of("category").unwrap_or_default());
    if let Some(date) = matches.value_of("date") {
        input = input.with_date(parse_date(date)?);
    }
    if let Some(description) = matches.value_of("description") {
        input = input.with_description(description);
    }
    Ok(input)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| Error::validation("date", e))
}

async fn signed_in(matches: &ArgMatches, options: ClientOptions) -> Result<Spendwise> {
    let app = Spendwise::from_env(options)?;
    let email = matches.value_of("email").unwrap_or_default();
    let password = matches.value_of("password").unwrap_or_default();
    app.sign_in(email, password).await?;
    Ok(app)
}

fn print_summary(summary: &MonthSummary) {
    println!("Expenses for {}", summary.window);
    if summary.is_empty() {
        println!("  no transactions");
        return;
    }

    println!();
    for entry in &summary.totals {
        println!("  {:<20} {:>12}  {}", entry.label, format_amount(entry.total), entry.color);
    }
    println!("  {:<20} {:>12}", "Total", format_amount(summary.grand_total));

    println!();
    for card in &summary.cards {
        println!(
            "  {}  {:>12}  {:<16} {}",
            card.date,
            card.amount,
            card.category,
            card.description.as_deref().unwrap_or("")
        );
    }
}

async fn run(matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("summary", sub)) => {
            let colors: ColorStrategy = sub.value_of("palette").unwrap_or("hue").parse()?;
            let window = summary_month(sub)?;
            let app = signed_in(sub, ClientOptions::default().with_colors(colors)).await?;
            app.transactions().load_month(window.start()).await?;
            print_summary(&app.transactions().summary());
            app.sign_out().await
        }
        Some(("add", sub)) => {
            let input = entry_input(sub)?;
            let app = signed_in(sub, ClientOptions::default()).await?;
            let created = app.transactions().create_transaction(&input).await?;
            println!("{} {} {}", created.id, created.date, format_amount(created.amount));
            app.sign_out().await
        }
        Some(("update", sub)) => {
            let input = entry_input(sub)?;
            let app = signed_in(sub, ClientOptions::default()).await?;
            let updated = app
                .transactions()
                .update_transaction(sub.value_of("id").unwrap_or_default(), &input)
                .await?;
            println!("{} {} {}", updated.id, updated.date, format_amount(updated.amount));
            app.sign_out().await
        }
        Some(("delete", sub)) => {
            let app = signed_in(sub, ClientOptions::default()).await?;
            app.transactions()
                .delete_transaction(sub.value_of("id").unwrap_or_default())
                .await?;
            app.sign_out().await
        }
        Some(("categories", sub)) => {
            let app = signed_in(sub, ClientOptions::default()).await?;
            for category in app.transactions().categories().await? {
                println!("{}\t{}", category.id, category.name);
            }
            app.sign_out().await
        }
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    if let Err(e) = run(cli().get_matches()).await {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn month_argument() {
        assert_eq!(
            parse_month("2024-02").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert!(parse_month("2024-13").is_err());
    }

    #[test]
    fn summary_month_steps() {
        let matches = cli().get_matches_from([
            "spendwise", "summary", "-e", "a@example.com", "-p", "secret", "--month", "2024-01",
            "--previous",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(summary_month(sub).unwrap().to_string(), "2023-12");

        let matches = cli().get_matches_from([
            "spendwise", "summary", "-e", "a@example.com", "-p", "secret", "--month", "2024-12",
            "--next",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(summary_month(sub).unwrap().to_string(), "2025-01");
    }

    #[test]
    fn update_reuses_entry_arguments() {
        let matches = cli().get_matches_from([
            "spendwise", "update", "t-42", "-e", "a@example.com", "-p", "secret", "--amount",
            "12.5", "--category", "food", "--date", "2024-05-20", "--description", "lunch",
        ]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "update");
        assert_eq!(sub.value_of("id"), Some("t-42"));

        let input = entry_input(sub).unwrap();
        assert_eq!(input.amount, Some(12.5));
        assert_eq!(input.category_id.as_deref(), Some("food"));
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 5, 20));
        assert_eq!(input.description.as_deref(), Some("lunch"));
    }

    #[test]
    fn bad_amount_is_rejected() {
        let matches = cli().get_matches_from([
            "spendwise", "add", "-e", "a@example.com", "-p", "secret", "--amount", "lots",
            "--category", "food",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        assert!(matches!(
            entry_input(sub),
            Err(Error::Validation { field: "amount", .. })
        ));
    }
}
