use std::error::Error;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, pens, vaccines};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "porcile_admin")]
#[command(about = "Admin utilities for Porcile (bootstrap pens/vaccines)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./porcile.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Pen(Pen),
    Vaccine(Vaccine),
}

#[derive(Args, Debug)]
struct Pen {
    #[command(subcommand)]
    command: PenCommand,
}

#[derive(Subcommand, Debug)]
enum PenCommand {
    Create(PenCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct PenCreateArgs {
    #[arg(long)]
    name: String,
    /// Intake date of the housed cohort (YYYY-MM-DD).
    #[arg(long)]
    intake_date: NaiveDate,
}

#[derive(Args, Debug)]
struct Vaccine {
    #[command(subcommand)]
    command: VaccineCommand,
}

#[derive(Subcommand, Debug)]
enum VaccineCommand {
    Create(VaccineCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct VaccineCreateArgs {
    #[arg(long)]
    name: String,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Pen(Pen {
            command: PenCommand::Create(args),
        }) => {
            let pen = engine::Pen::new(args.name, args.intake_date);
            pens::ActiveModel::from(&pen).insert(&db).await?;
            println!("created pen: {} ({})", pen.name, pen.id);
        }
        Command::Pen(Pen {
            command: PenCommand::List,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            for pen in engine.list_pens().await? {
                println!("{}\t{}\t{}", pen.id, pen.name, pen.intake_date);
            }
        }
        Command::Vaccine(Vaccine {
            command: VaccineCommand::Create(args),
        }) => {
            let vaccine = engine::Vaccine::new(args.name);
            vaccines::ActiveModel::from(&vaccine).insert(&db).await?;
            println!("created vaccine: {} ({})", vaccine.name, vaccine.id);
        }
        Command::Vaccine(Vaccine {
            command: VaccineCommand::List,
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            for vaccine in engine.list_vaccines().await? {
                println!("{}\t{}", vaccine.id, vaccine.name);
            }
        }
    }

    Ok(())
}
