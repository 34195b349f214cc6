// Tari Faqqer - Free and Open Source Software Statement
//
// This project, faqqer, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/main.rs
// Version: 1.4.0
// Developer: Tari Faqqer Contributors
//
// This file is the faqqer binary. It loads the configuration once, installs
// logging and dispatches to the subcommand handlers. `run` wires the
// scheduled jobs and the bot dispatcher together and runs them until Ctrl-C.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use faqqer::{
    archive::{ChannelHistoryFetcher, MediaStore, archive_channels, window_hours},
    bot::{CommandHandler, Dispatcher},
    chat::{ChatError, ChatTarget, ExportHistory, MessageHistory, MessageSender, TelegramBotClient},
    config::AppConfig,
    discord::{DiscordApiClient, InteractionHandler, InteractionVerifier},
    core::types::{Args, Command, HashRatesCommand, OutputFormat},
    explorer::{ExplorerClient, StatsSource},
    hashrate,
    jobs::{
        BlockHeightJob, CustomerAnalysisJob, CronSchedule, HashPowerJob, Job, JobRunner, JobScheduler,
        Network, network_stats::hash_power_message,
    },
    llm::{CompletionClient, CustomerAnalyzer, FaqResponder, OpenAiClient},
    logging::init_logging,
};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "tari::faqqer::main";

/// Prints posts instead of sending them, for one-off CLI runs
struct StdoutSender;

#[async_trait]
impl MessageSender for StdoutSender {
    async fn send_message(&self, target: &ChatTarget, text: &str, _reply_to: Option<i64>) -> Result<(), ChatError> {
        println!("--- to {} ---\n{}", target, text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;
    let config = Arc::new(config);

    match args.command {
        Command::Run => handle_run(config).await,
        Command::Stats { nextnet } => handle_stats(&config, nextnet).await,
        Command::Ask { question } => handle_ask(&config, &question.join(" ")).await,
        Command::Archive {
            channels,
            hours,
            format,
            output_dir,
        } => handle_archive(&config, &channels, hours, format, &output_dir).await,
        Command::Analyze { hours, topic, post } => handle_analyze(config, hours, topic, post).await,
        Command::HashRates(command) => handle_hash_rates(&config, command).await,
    }
}

fn telegram_client(config: &AppConfig) -> Result<TelegramBotClient> {
    // Long polls must finish before the HTTP timeout fires
    let timeout = Duration::from_secs(config.telegram.poll_timeout_secs + 15);
    Ok(TelegramBotClient::new(
        &config.telegram.api_base,
        config.bot_token()?,
        timeout,
    )?)
}

fn completion_client(config: &AppConfig) -> Result<Arc<dyn CompletionClient>> {
    Ok(Arc::new(OpenAiClient::new(&config.openai.base_url, config.openai_key()?)?))
}

/// Exported chat history when configured, otherwise the Bot API
fn history_transport(config: &AppConfig) -> Result<Arc<dyn MessageHistory>> {
    match &config.history.export_dir {
        Some(dir) => {
            info!(target: LOG_TARGET, "Reading channel history from exports in {:?}", dir);
            Ok(Arc::new(ExportHistory::new(dir.clone())))
        }
        None => {
            warn!(
                target: LOG_TARGET,
                "No history export configured; bot accounts cannot read channel history"
            );
            Ok(Arc::new(telegram_client(config)?))
        }
    }
}

fn history_fetcher(config: &AppConfig, transport: Arc<dyn MessageHistory>) -> ChannelHistoryFetcher {
    ChannelHistoryFetcher::new(transport, config.history.page_size, config.page_delay())
}

fn explorer(config: &AppConfig, nextnet: bool) -> Result<ExplorerClient> {
    let url = if nextnet {
        &config.explorer.nextnet_url
    } else {
        &config.explorer.mainnet_url
    };
    Ok(ExplorerClient::new(
        url,
        Duration::from_secs(config.explorer.request_timeout_secs),
    )?)
}

/// Interactions handler when a Discord public key is configured
async fn discord_handler(config: &AppConfig, faq: Arc<FaqResponder>) -> Result<Option<Arc<InteractionHandler>>> {
    let settings = &config.discord;
    let (Some(public_key), Some(application_id)) = (&settings.public_key, &settings.application_id) else {
        return Ok(None);
    };
    let client = DiscordApiClient::new(
        &settings.api_base,
        application_id,
        settings.bot_token.as_deref(),
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    match &settings.guild_id {
        Some(guild) if settings.bot_token.is_some() => {
            if let Err(e) = client.register_guild_commands(guild).await {
                error!(target: LOG_TARGET, "Failed to register Discord commands: {}", e);
            }
        }
        _ => info!(target: LOG_TARGET, "Discord commands not registered; set DISCORD_BOT_TOKEN and GUILD_ID"),
    }
    let verifier = InteractionVerifier::from_hex(public_key)?;
    Ok(Some(Arc::new(InteractionHandler::new(verifier, faq, Arc::new(client)))))
}

fn schedule(expr: &str) -> Result<CronSchedule> {
    CronSchedule::parse(expr).with_context(|| format!("Invalid schedule '{}'", expr))
}

async fn handle_run(config: Arc<AppConfig>) -> Result<()> {
    let telegram = telegram_client(&config)?;
    let me = telegram.authenticate().await.context("Bot token was rejected")?;
    info!(target: LOG_TARGET, "🤖 Running as @{}", me.username.as_deref().unwrap_or("unknown"));

    let sender: Arc<dyn MessageSender> = Arc::new(telegram.clone());
    let completions = completion_client(&config)?;
    let faq = Arc::new(FaqResponder::load(completions.clone(), &config).await?);
    let mainnet: Arc<dyn StatsSource> = Arc::new(explorer(&config, false)?);
    let groups: Vec<ChatTarget> = config
        .jobs
        .announcement_groups
        .iter()
        .map(|id| ChatTarget::Id(*id))
        .collect();

    let mut scheduler = JobScheduler::new();
    scheduler.add(
        JobRunner::new(Arc::new(BlockHeightJob::new(
            Network::Mainnet,
            mainnet.clone(),
            sender.clone(),
            groups.clone(),
        ))),
        schedule(&config.jobs.block_height_cron)?,
    );
    scheduler.add(
        JobRunner::new(Arc::new(HashPowerJob::new(mainnet, sender.clone(), groups))),
        schedule(&config.jobs.hash_power_cron)?,
    );
    if let Some(group) = config.jobs.nextnet_group {
        let nextnet: Arc<dyn StatsSource> = Arc::new(explorer(&config, true)?);
        scheduler.add(
            JobRunner::new(Arc::new(BlockHeightJob::new(
                Network::Nextnet,
                nextnet,
                sender.clone(),
                vec![ChatTarget::Id(group)],
            ))),
            schedule(&config.jobs.nextnet_cron)?,
        );
    }

    let analysis = Arc::new(CustomerAnalysisJob::new(
        config.clone(),
        history_fetcher(&config, history_transport(&config)?),
        CustomerAnalyzer::new(completions, &config),
        sender.clone(),
    ));
    let analysis_job: Arc<dyn Job> = analysis.clone();
    scheduler.add(
        JobRunner::new(analysis_job),
        schedule(&config.jobs.customer_analysis_cron)?,
    );
    if let Some(warning) = config.analysis_history_warning() {
        warn!(target: LOG_TARGET, "{}", warning);
    }
    info!(target: LOG_TARGET, "Scheduled {} jobs", scheduler.len());

    let discord = match discord_handler(&config, faq.clone()).await? {
        Some(handler) => {
            let addr = config.discord.listen_addr.clone();
            let shutdown = scheduler.subscribe();
            Some(tokio::spawn(async move {
                faqqer::discord::serve(&addr, handler, shutdown).await
            }))
        }
        None => None,
    };

    let handler = Arc::new(CommandHandler::new(
        faq,
        Some(analysis),
        sender,
        config.analysis.hours,
    ));
    let dispatcher = Dispatcher::new(
        Arc::new(telegram),
        handler,
        me.username,
        config.telegram.workers,
        config.telegram.poll_timeout_secs,
    );
    let bot = tokio::spawn(dispatcher.run(scheduler.subscribe()));

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!(target: LOG_TARGET, "Shutting down, waiting for running jobs to finish");
    scheduler.shutdown().await;
    bot.await.context("Bot dispatcher ended abnormally")?;
    if let Some(discord) = discord {
        if let Err(e) = discord.await.context("Discord endpoint ended abnormally")? {
            error!(target: LOG_TARGET, "Discord endpoint failed: {}", e);
        }
    }
    info!(target: LOG_TARGET, "✅ Stopped");
    Ok(())
}

async fn handle_stats(config: &AppConfig, nextnet: bool) -> Result<()> {
    let client = explorer(config, nextnet)?;
    let stats = client.fetch_network_stats().await?;
    match hash_power_message(&stats) {
        Some(text) => println!("{}", text),
        None => println!("Explorer at {} reported no block height: {:?}", client.url(), stats),
    }
    Ok(())
}

async fn handle_ask(config: &AppConfig, question: &str) -> Result<()> {
    let faq = FaqResponder::load(completion_client(config)?, config).await?;
    println!("{}", faq.answer(question).await);
    Ok(())
}

async fn handle_archive(
    config: &AppConfig,
    channels: &[String],
    hours: u64,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<()> {
    let transport = history_transport(config)?;
    let fetcher = history_fetcher(config, transport.clone());
    let media = MediaStore::new(transport, output_dir.join(&config.history.media_dir));

    let outcome = archive_channels(
        &fetcher,
        channels,
        window_hours(hours),
        output_dir,
        format,
        Some(&media),
    )
    .await?;

    let stats = outcome.stats;
    println!("📁 Archive written to {}", stats.output_path.display());
    println!("   Messages: {}", stats.total_messages);
    println!("   Unique senders: {}", stats.unique_senders);
    println!("   Channels: {}", stats.channels_processed.join(", "));
    for (channel, failure) in &stats.failures {
        println!("   ❌ {}: {}", channel, failure);
    }
    Ok(())
}

async fn handle_analyze(config: Arc<AppConfig>, hours: Option<u64>, topic: Option<String>, post: bool) -> Result<()> {
    let hours = hours.unwrap_or(config.analysis.hours);
    let sender: Arc<dyn MessageSender> = if post {
        Arc::new(telegram_client(&config)?)
    } else {
        Arc::new(StdoutSender)
    };
    let job = CustomerAnalysisJob::new(
        config.clone(),
        history_fetcher(&config, history_transport(&config)?),
        CustomerAnalyzer::new(completion_client(&config)?, &config),
        sender,
    );

    if post {
        let target = ChatTarget::Id(config.analysis.customer_service_group);
        let run = job.trigger(&target, None, hours, topic.as_deref()).await;
        info!(target: LOG_TARGET, "Analysis posted to {}: {:?}", target, run);
    } else {
        for part in job.build_report(hours, topic.as_deref()).await {
            println!("{}\n", part);
        }
    }
    Ok(())
}

async fn handle_hash_rates(config: &AppConfig, command: HashRatesCommand) -> Result<()> {
    let summary = match command {
        HashRatesCommand::Retrieve { channel, since, output } => {
            let fetcher = history_fetcher(config, history_transport(config)?);
            hashrate::retrieve(&fetcher, &channel, since, &output).await?
        }
        HashRatesCommand::Normalize { input, output } => hashrate::normalize(&input, &output).await?,
    };

    if let Some(path) = &summary.history_path {
        println!("History: {}", path.display());
    }
    println!("CSV: {}", summary.csv_path.display());
    println!("Report posts: {}", summary.posts);
    if summary.unreadable_fields > 0 {
        println!("⚠️ {} fields could not be read (see log)", summary.unreadable_fields);
    }
    Ok(())
}

// Changelog:
// - v1.4.0 (2026-10-18): Discord interactions endpoint alongside the Telegram bot.
//   - Warns at startup when scheduled analyses have no history export.
// - v1.3.0 (2026-09-30): hash-rates and archive subcommands.
//   - History is read from Telegram Desktop exports when configured.
// - v1.2.0 (2026-08-12): /analyze_support and the analyze subcommand.
// - v1.0.0 (2026-07-01): Scheduled jobs and the FAQ bot.
