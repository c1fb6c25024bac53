use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use parley::config::fill_placeholders;
use parley::{BotConfig, Credentials, ProviderRegistry, ReplyOrchestrator};

mod logging;
mod prompt;
mod session;
mod transcript;

use logging::setup_logging;
use prompt::{select_from_list, RustylinePrompt};
use session::SessionSettings;
use transcript::Transcript;

/// Test values substituted into prompt placeholders
const PROMPT_PLACEHOLDERS: &[(&str, &str)] = &[
    ("user", "[test_user]"),
    ("subreddit_rules", "[test subreddit rules]"),
];
const FIRST_MESSAGE_PLACEHOLDERS: &[(&str, &str)] = &[
    ("subreddit", "[test_subreddit]"),
    ("comment", "[test comment]"),
];

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Interactive utility for testing bot prompts and conversations",
    long_about = None
)]
struct Cli {
    /// Path to configuration YAML file
    #[arg(long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Path to output file for saving conversations
    #[arg(long, value_name = "FILE", default_value = "test_conversations.txt")]
    output: PathBuf,

    /// Logging level
    #[arg(
        long = "log",
        alias = "loglevel",
        value_name = "LEVEL",
        default_value = "info"
    )]
    loglevel: String,
}

fn banner(title: &str) {
    let rule = "=".repeat(80);
    println!("\n{}\n{}\n{}", rule, title, rule);
}

fn select_model(config: &BotConfig) -> Result<(String, String)> {
    let models = config.list_available_models();
    if models.is_empty() {
        bail!("No GAI models found in config file");
    }
    let displays: Vec<String> = models
        .iter()
        .map(|(platform, model)| format!("{}: {}", platform, model))
        .collect();
    let index = select_from_list("Select a GAI model:", &displays)?;
    Ok(models[index].clone())
}

/// Pick one entry of a keyed section, returning `(key, text)`
fn select_entry(
    section: &indexmap::IndexMap<String, String>,
    section_name: &str,
    prompt_text: &str,
) -> Result<(String, String)> {
    if section.is_empty() {
        bail!("No {} found in config file", section_name);
    }
    let keys: Vec<String> = section.keys().cloned().collect();
    let index = select_from_list(prompt_text, &keys)?;
    let (key, text) = section.get_index(index).context("selection out of range")?;
    Ok((key.clone(), text.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.loglevel)?;

    banner("Bot Prompt Testing Utility");

    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config file {}", cli.config.display()))?;
    let registry = ProviderRegistry::from_credentials(&Credentials::from_env());

    let (platform, model) = select_model(&config)?;
    println!("\nSelected: {} - {}", platform, model);

    let (prompt_key, bot_prompt) =
        select_entry(&config.gai_prompt, "bot prompts", "Select a bot prompt:")?;
    println!("\nSelected prompt: {}", prompt_key);

    let (first_message_key, first_message) = select_entry(
        &config.first_consented_message,
        "first consented messages",
        "Select a first consented message:",
    )?;
    println!("\nSelected first message: {}", first_message_key);

    let settings = SessionSettings {
        max_tokens: config.max_tokens_for(&model),
        max_interactions: config.max_interactions(),
        goodbye_message: config.goodbye_message().to_string(),
        bot_prompt: fill_placeholders(&bot_prompt, PROMPT_PLACEHOLDERS),
        first_message: fill_placeholders(&first_message, FIRST_MESSAGE_PLACEHOLDERS),
        platform,
        model,
    };

    banner("Starting conversation. Type 'exit' or 'quit' to end the conversation.");
    println!();

    let orchestrator = ReplyOrchestrator::new(&registry);
    let mut prompt = RustylinePrompt::new()?;
    let conversation = session::run(&mut prompt, &orchestrator, &settings).await?;

    let transcript = Transcript {
        timestamp: chrono::Local::now(),
        platform: &settings.platform,
        model: &settings.model,
        prompt_key: &prompt_key,
        first_message_key: &first_message_key,
        system_prompt: &settings.bot_prompt,
        messages: &conversation.messages,
    };
    if transcript.save(&cli.output) {
        println!(
            "\nConversation saved to {}",
            style(cli.output.display()).cyan()
        );
    }

    Ok(())
}
