use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tracing::info;

use sentitui::client::http::{ApiClient, PostFilter};
use sentitui::client::{FeedEvent, TransportClient};
use sentitui::config::Config;
use sentitui::controller::DashboardController;
use sentitui::ui;
use sentitui::ui::widgets::feed::LiveFeedWidget;
use sentitui::ui::widgets::stats::StatsWidget;

#[derive(Debug, Parser)]
#[command(name = "sentitui", about = "Terminal dashboard for real-time sentiment monitoring")]
struct Args {
    /// Sentiment API host (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Sentiment API port (overrides the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Path to an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check API health and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.api_host = host;
    }
    if let Some(port) = args.port {
        config.api_port = port;
    }

    let _log_guard = init_tracing();

    let api = Arc::new(ApiClient::new(
        config.http_base(),
        Duration::from_secs(config.fetch_timeout_secs),
        PostFilter {
            platform: config.platform_filter.clone(),
            sentiment: None,
        },
    ));

    if args.health {
        let health = api.fetch_health().await?;
        println!("status: {}", health.status);
        for (service, state) in &health.services {
            println!("  {service}: {state}");
        }
        for (stat, value) in &health.stats {
            println!("  {stat}: {value}");
        }
        return Ok(());
    }

    let terminal = ratatui::init();
    let result = run_app(terminal, config, api).await;
    ratatui::restore();
    result
}

/// Logs go to a file; writing to stderr would corrupt the drawn frame.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = dirs::data_local_dir()?.join("sentitui");
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::daily(dir, "sentitui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sentitui=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

async fn run_app(
    mut terminal: DefaultTerminal,
    config: Config,
    api: Arc<ApiClient>,
) -> Result<()> {
    info!(base = %config.http_base(), "starting dashboard");

    let (mut transport, mut events) = TransportClient::connect(&config, api.clone());
    let mut controller = DashboardController::new(config.feed_capacity);
    let mut feed_widget = LiveFeedWidget::new();
    let stats_widget = StatsWidget::new();

    let mut input = EventStream::new();
    let mut redraw = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break };
                // the original dashboard refetched the full state whenever
                // the push channel announced activity
                let nudge = matches!(event, FeedEvent::NewPost(_) | FeedEvent::MetricsUpdate);
                controller.apply(event);
                if nudge {
                    transport.request_refresh();
                }
            }
            maybe_key = input.next() => {
                match maybe_key {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if handle_key(
                            key.code,
                            key.modifiers,
                            &mut feed_widget,
                            &mut controller,
                            &mut transport,
                            &api,
                            &config,
                        )
                        .await
                        {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
            _ = redraw.tick() => {}
        }

        terminal.draw(|frame| {
            ui::draw(frame, controller.state(), &feed_widget, &stats_widget)
        })?;
    }

    transport.close();
    Ok(())
}

/// Returns true when the app should quit.
async fn handle_key(
    code: KeyCode,
    modifiers: KeyModifiers,
    feed_widget: &mut LiveFeedWidget,
    controller: &mut DashboardController,
    transport: &mut TransportClient,
    api: &ApiClient,
    config: &Config,
) -> bool {
    if feed_widget.is_composing() {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc => feed_widget.close_modal(),
            KeyCode::Enter => {
                if let Some(content) = feed_widget.take_compose() {
                    let platform = config
                        .platform_filter
                        .clone()
                        .unwrap_or_else(|| "web".to_string());
                    match api
                        .create_post(content, config.author.clone(), platform)
                        .await
                    {
                        Ok(post) => {
                            feed_widget.set_status(format!("posted as {}", post.id));
                            transport.request_refresh();
                        }
                        Err(err) => feed_widget.set_status(format!("post failed: {err}")),
                    }
                }
            }
            KeyCode::Backspace => feed_widget.delete_char(),
            KeyCode::Char(c) => feed_widget.add_char(c),
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('c') => feed_widget.open_compose(),
        KeyCode::Char('r') => {
            transport.reopen_socket();
            controller.reconnecting();
        }
        KeyCode::Up | KeyCode::Char('k') => feed_widget.scroll_up(),
        KeyCode::Down | KeyCode::Char('j') => {
            let count = controller.state().feed.len();
            feed_widget.scroll_down(count);
        }
        _ => {}
    }
    false
}
