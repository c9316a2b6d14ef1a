use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use protection_gateway::config::schema::TokenBucketPolicyConfig;
use protection_gateway::console::scenarios::{
    find_case, find_scenario, TestCase, BOT_CASES, RAPID_SIGNUP_ATTEMPTS, SCENARIOS,
    SENSITIVE_INFO_CASES, SIGNUP_CASES,
};
use protection_gateway::console::{
    apply_exchange, BucketParams, BucketSnapshot, ConsoleError, CountdownSimulator, Exchange,
    GatewayClient,
};

#[derive(Parser)]
#[command(name = "demo-console")]
#[command(about = "Operator console for the protection gateway demo routes", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call the generic protect route (GET, or POST with --data)
    Protect {
        /// JSON payload to POST
        #[arg(long)]
        data: Option<String>,
    },
    /// Send a request with a chosen User-Agent
    Bot {
        #[arg(long, conflicts_with = "case")]
        user_agent: Option<String>,
        /// Built-in test case label
        #[arg(long)]
        case: Option<String>,
        /// List built-in test cases
        #[arg(long)]
        list: bool,
    },
    /// Run a request pattern against the rate-limit route
    RateLimit {
        /// single, burst, spaced or overflow
        #[arg(long, default_value = "single")]
        scenario: String,
        /// Keep showing the refill countdown until the bucket is full
        #[arg(long)]
        watch: bool,
        /// List scenarios
        #[arg(long)]
        list: bool,
    },
    /// Submit free text for sensitive-information detection
    SensitiveInfo {
        #[arg(long, conflicts_with = "case")]
        text: Option<String>,
        #[arg(long)]
        case: Option<String>,
        #[arg(long)]
        list: bool,
    },
    /// Send a request through the shield
    Shield {
        #[arg(long)]
        input: Option<String>,
        /// Mark the request as an attack for the engine's test mode
        #[arg(long)]
        suspicious: bool,
    },
    /// Submit a signup email
    Signup {
        #[arg(long, conflicts_with = "case")]
        email: Option<String>,
        #[arg(long)]
        case: Option<String>,
        #[arg(long)]
        list: bool,
        /// Submit six times in a row and show the last response
        #[arg(long)]
        rapid: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = GatewayClient::new(&cli.url)?;

    match cli.command {
        Commands::Protect { data } => {
            let data = data.map(|d| serde_json::from_str::<Value>(&d)).transpose()?;
            print_exchange(&client.protect(data).await?)?;
        }
        Commands::Bot { user_agent, case, list } => {
            if list {
                print_cases(BOT_CASES);
                return Ok(());
            }
            let user_agent = resolve(user_agent, case, BOT_CASES, "bot case")?;
            println!("User-Agent: {}", if user_agent.is_empty() { "(empty)" } else { user_agent.as_str() });
            print_exchange(&client.bot_detection(&user_agent).await?)?;
        }
        Commands::RateLimit { scenario, watch, list } => {
            if list {
                for s in SCENARIOS {
                    println!(
                        "{:<10} {:>2} requests, {:>4}ms apart  {}",
                        s.label,
                        s.requests,
                        s.delay.as_millis(),
                        s.description
                    );
                }
                return Ok(());
            }
            let scenario = find_scenario(&scenario).ok_or_else(|| ConsoleError::UnknownCase {
                kind: "scenario",
                label: scenario.clone(),
            })?;
            run_rate_limit(&client, scenario, watch).await?;
        }
        Commands::SensitiveInfo { text, case, list } => {
            if list {
                print_cases(SENSITIVE_INFO_CASES);
                return Ok(());
            }
            let text = resolve(text, case, SENSITIVE_INFO_CASES, "sensitive-info case")?;
            print_exchange(&client.sensitive_info(&text).await?)?;
        }
        Commands::Shield { input, suspicious } => {
            print_exchange(&client.shield(input.as_deref(), suspicious).await?)?;
        }
        Commands::Signup { email, case, list, rapid } => {
            if list {
                print_cases(SIGNUP_CASES);
                return Ok(());
            }
            let email = resolve(email, case, SIGNUP_CASES, "signup case")?;
            if rapid {
                let mut last = None;
                for attempt in 1..=RAPID_SIGNUP_ATTEMPTS {
                    let exchange = client.signup(&email).await?;
                    println!("Attempt #{} -> {}", attempt, exchange.status);
                    last = Some(exchange);
                }
                if let Some(last) = last {
                    print_exchange(&last)?;
                }
            } else {
                print_exchange(&client.signup(&email).await?)?;
            }
        }
    }

    Ok(())
}

/// Explicit value wins; otherwise look up a built-in case.
fn resolve(
    value: Option<String>,
    case: Option<String>,
    cases: &'static [TestCase],
    kind: &'static str,
) -> Result<String, ConsoleError> {
    if let Some(value) = value {
        return Ok(value);
    }
    let label = case.unwrap_or_else(|| cases[0].label.to_string());
    find_case(cases, &label)
        .map(|c| c.value.to_string())
        .ok_or(ConsoleError::UnknownCase { kind, label })
}

async fn run_rate_limit(
    client: &GatewayClient,
    scenario: &protection_gateway::console::Scenario,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = BucketParams::from(&TokenBucketPolicyConfig::default());
    let mut sim = CountdownSimulator::new(params);

    println!(
        "Scenario '{}': {} request(s), {}ms apart",
        scenario.label,
        scenario.requests,
        scenario.delay.as_millis()
    );

    for i in 0..scenario.requests {
        let exchange = client.rate_limit().await?;
        apply_exchange(&mut sim, &exchange);
        println!(
            "Request #{} [{}] {}ms  {}",
            i + 1,
            exchange.status,
            exchange.duration_ms,
            exchange.body
        );
        print_bucket(&sim.snapshot());
        if !scenario.delay.is_zero() {
            tokio::time::sleep(scenario.delay).await;
        }
    }

    if watch {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => break,
            }
            let snapshot = sim.tick();
            print_bucket(&snapshot);
            if snapshot.full {
                break;
            }
        }
    }

    Ok(())
}

fn print_bucket(snapshot: &BucketSnapshot) {
    match snapshot.seconds_until_refill {
        Some(secs) => println!(
            "  bucket {}/{} tokens, +{} in {}s",
            snapshot.tokens, snapshot.capacity, snapshot.refill_amount, secs
        ),
        None => println!("  bucket {}/{} tokens (full)", snapshot.tokens, snapshot.capacity),
    }
}

fn print_cases(cases: &[TestCase]) {
    for case in cases {
        let expect = if case.expect_allowed { "allow" } else { "deny" };
        println!("{:<28} [{}] {}", case.label, expect, case.description);
    }
}

fn print_exchange(exchange: &Exchange) -> Result<(), serde_json::Error> {
    println!("Status: {} ({}ms)", exchange.status, exchange.duration_ms);
    println!("{}", serde_json::to_string_pretty(&exchange.body)?);
    Ok(())
}
