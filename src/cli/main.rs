use anyhow::{Context, Result};
use bank_churn_predictor::client::ChurnClient;
use bank_churn_predictor::models::{CustomerProfile, Gender, Geography, YesNo};
use bank_churn_predictor::report::Verdict;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "churn-cli")]
#[command(about = "Bank customer churn predictor CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CHURN_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict churn for one customer
    Predict(PredictArgs),

    /// Show the loaded model
    Model,

    /// Check server health
    Health,
}

#[derive(Args)]
struct PredictArgs {
    /// Name used in the verdict
    #[arg(short, long, default_value = "")]
    name: String,

    #[arg(long)]
    credit_score: u32,

    /// France, Spain or Germany
    #[arg(long)]
    geography: Option<Geography>,

    /// Female or Male
    #[arg(long)]
    gender: Option<Gender>,

    #[arg(long)]
    age: u32,

    #[arg(long)]
    tenure: u32,

    #[arg(long)]
    balance: f64,

    #[arg(long)]
    num_of_products: u32,

    /// yes or no
    #[arg(long)]
    has_cr_card: Option<YesNo>,

    /// yes or no
    #[arg(long)]
    is_active_member: Option<YesNo>,

    #[arg(long)]
    estimated_salary: f64,

    /// Print the raw JSON response
    #[arg(long)]
    json: bool,
}

impl From<&PredictArgs> for CustomerProfile {
    fn from(args: &PredictArgs) -> Self {
        Self {
            name: args.name.clone(),
            credit_score: args.credit_score,
            geography: args.geography,
            gender: args.gender,
            age: args.age,
            tenure: args.tenure,
            balance: args.balance,
            num_of_products: args.num_of_products,
            has_cr_card: args.has_cr_card,
            is_active_member: args.is_active_member,
            estimated_salary: args.estimated_salary,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ChurnClient::new(&cli.endpoint).context("failed to build HTTP client")?;

    match cli.command {
        Commands::Predict(args) => {
            let profile = CustomerProfile::from(&args);
            let response = client
                .predict(&profile)
                .await
                .with_context(|| format!("prediction request to {} failed", client.endpoint()))?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_verdict(&response.verdict);
            }
        }

        Commands::Model => {
            let metadata = client.model().await.context("model request failed")?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }

        Commands::Health => {
            let health = client.health().await.context("health request failed")?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
    }

    Ok(())
}

fn print_verdict(verdict: &Verdict) {
    const WIDTH: usize = 40;
    let filled = usize::from(verdict.progress) * WIDTH / 100;

    println!("{}", verdict.headline);
    println!("{}: {}", verdict.probability_label, verdict.probability_text);
    println!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        verdict.progress
    );
    println!("{}", verdict.caption);
}
