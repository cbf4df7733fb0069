use crate::infra::InMemoryAccountDirectory;
use clap::Args;
use registration_flow::config::AppConfig;
use registration_flow::error::AppError;
use registration_flow::flow::{FormFlow, FormValues, SubmitOutcome};
use registration_flow::registration::{fields, ids, registration_flow};
use serde_json::json;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Email used on the account step
    #[arg(long, default_value = "grace@example.com")]
    pub(crate) email: String,
    /// Answer the military status step as a veteran to bring in the military details step
    #[arg(long)]
    pub(crate) veteran: bool,
    /// Pre-register the email so the account step fails and the demo retries with an alias
    #[arg(long)]
    pub(crate) taken_email: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let directory = Arc::new(InMemoryAccountDirectory::default());
    if args.taken_email {
        directory.reserve(&args.email);
    }

    let flow = registration_flow(directory.clone(), config.flow.normalizer())?;
    let mut state = flow.start();
    let mut email = args.email.clone();

    println!("Registration flow demo");
    render_active_steps(&flow, state.values());

    // Every step is visited at most twice (one retry after a failure).
    let budget = flow.candidates().len() * 2;
    for _ in 0..budget {
        let step_id = flow.current_step(&state).id().to_string();
        let answers = answers_for(&step_id, &email, args.veteran);
        println!(
            "\n[{}/{}] {}",
            state.step_number() + 1,
            state.navigator().step_count(),
            flow.current_step(&state).title()
        );

        match flow.submit(&mut state, answers).await {
            SubmitOutcome::Invalid { errors, .. } => {
                println!("  rejected: {errors}");
                break;
            }
            SubmitOutcome::Advanced { to, .. } => {
                println!("  ok, next step: {to}");
                render_active_steps(&flow, state.values());
            }
            SubmitOutcome::Failed { message, .. } => {
                println!("  failed: {}", message.replace('\n', "; "));
                if step_id == ids::INITIAL && email == args.email {
                    email = alias_of(&args.email);
                    println!("  retrying with {email}");
                    continue;
                }
                break;
            }
            SubmitOutcome::Completed { values } => {
                println!(
                    "  registration submitted for {}",
                    values.text(fields::EMAIL).unwrap_or("-")
                );
                break;
            }
        }
    }

    let accounts = directory.accounts();
    println!("\nAccounts created: {}", accounts.len());
    for account in accounts {
        println!(
            "- {} {} <{}> status={} branch={}",
            account.first_name,
            account.last_name,
            account.email,
            account.military_status,
            account.branch_of_service.as_deref().unwrap_or("n/a"),
        );
    }

    Ok(())
}

fn render_active_steps(flow: &FormFlow, values: &FormValues) {
    println!("  active steps: {}", flow.active_steps(values).ids().join(" → "));
}

fn alias_of(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{local}+demo@{domain}"),
        None => format!("{email}+demo"),
    }
}

fn answers_for(step_id: &str, email: &str, veteran: bool) -> FormValues {
    match step_id {
        ids::INITIAL => FormValues::new()
            .with(fields::EMAIL, email)
            .with(fields::PASSWORD, "demo-password")
            .with(fields::CONFIRM_PASSWORD, "demo-password"),
        ids::PERSONAL_DETAILS => FormValues::new()
            .with(fields::FIRST_NAME, "Grace")
            .with(fields::LAST_NAME, "Hopper")
            .with(fields::ZIPCODE, "10001"),
        ids::MILITARY_STATUS => FormValues::new().with(
            fields::MILITARY_STATUS,
            if veteran { "veteran" } else { "civilian" },
        ),
        ids::MILITARY_DETAILS => FormValues::new()
            .with(fields::BRANCH_OF_SERVICE, "navy")
            .with(fields::PAY_GRADE, "O-10"),
        ids::TECHNOLOGY => FormValues::new()
            .with(fields::PROGRAMMING_LANGUAGES, json!(["python", "rust"]))
            .with(fields::DISCIPLINES, json!(["backend", "data"])),
        _ => FormValues::new(),
    }
}
