use anyhow::{Context, Result};
use clap::Parser;
use keybind_capture::mappings::KeyNames;
use keybind_capture::services::event_source::{SyntheticController, SyntheticEventSource};
use keybind_capture::{
    create_event_source, Callbacks, CaptureTarget, Chord, Config, EventSource, KeybindSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Время на доставку срабатываний после конца ввода в `--dry-run`
const DRAIN_DELAY: Duration = Duration::from_millis(200);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "keybind-capture")]
#[command(about = "Захват глобальных сочетаний клавиш и вывод срабатываний")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "keybind.toml")]
    config: String,

    /// Сочетания читаются из stdin и подаются через синтетический источник
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Окно, к которому привязывается захват
    #[arg(long)]
    window_id: Option<u64>,

    /// Дисплей, к которому привязывается захват
    #[arg(long)]
    display_id: Option<u64>,

    /// Вывести все известные имена клавиш и выйти
    #[arg(long)]
    list_keys: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_keys {
        for (name, code) in KeyNames::all() {
            println!("{:<16} {:?}", name, code);
        }
        return Ok(());
    }

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск keybind-capture v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let (source, controller): (Arc<dyn EventSource>, Option<SyntheticController>) = if args.dry_run {
        warn!("Режим сухого запуска: события читаются из stdin");
        let (source, controller) = SyntheticEventSource::new();
        (Arc::new(source), Some(controller))
    } else {
        (create_event_source(&config.capture), None)
    };

    let session = KeybindSession::with_repeat_policy(source, config.capture.repeat_policy);
    for (id, chord) in config.chords()? {
        session.register_chord(id, chord);
        info!("Keybind {}: {}", id, chord);
    }

    let fatal = Arc::new(Notify::new());
    let callbacks = build_callbacks(&session, &config, Arc::clone(&fatal));
    let target = CaptureTarget::new(
        args.window_id.or(config.capture.window_id),
        args.display_id.or(config.capture.display_id),
    );

    session
        .start_with(target, callbacks)
        .await
        .context("Не удалось запустить захват")?;

    let feeder = controller.map(|controller| tokio::spawn(feed_stdin(controller)));
    info!("Захват запущен, Ctrl+C для выхода");

    // Ожидание сигнала завершения
    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        },
        _ = fatal.notified() => warn!("Захват прекращён из-за ошибки источника"),
        _ = wait_feeder(feeder) => info!("Ввод завершён"),
    }

    info!("Завершение работы...");
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, session.stop()).await {
        Ok(Ok(())) => info!("Захват остановлен корректно"),
        Ok(Err(e)) => warn!("Ошибка при остановке захвата: {}", e),
        Err(_) => warn!("Таймаут при остановке захвата"),
    }

    info!("keybind-capture завершил работу");
    Ok(())
}

fn build_callbacks(session: &KeybindSession, config: &Config, fatal: Arc<Notify>) -> Callbacks {
    let registry = session.registry().clone();
    let mut callbacks = Callbacks::new(move |id| {
        let chord = registry.chord_of(id).map(|c| c.to_string()).unwrap_or_default();
        info!("Сработал keybind {} ({})", id, chord);
        println!("pressed {} {}", id, chord);
    })
    .on_error(move |e| {
        error!("Ошибка источника событий: {}", e);
        fatal.notify_one();
    });

    if config.capture.report_releases {
        callbacks = callbacks.on_released(|id| {
            info!("Отпущен keybind {}", id);
            println!("released {}", id);
        });
    }
    callbacks
}

/// Читать сочетания построчно и нажимать их через синтетический источник
async fn feed_stdin(controller: SyntheticController) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let spec = line.trim();
        if spec.is_empty() || spec.starts_with('#') {
            continue;
        }
        match Chord::parse(spec) {
            Ok(chord) => {
                if !controller.tap(&chord).await {
                    warn!("Источник закрыт, ввод прекращён");
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    tokio::time::sleep(DRAIN_DELAY).await;
    Ok(())
}

async fn wait_feeder(feeder: Option<JoinHandle<Result<()>>>) {
    let Some(feeder) = feeder else {
        return std::future::pending().await;
    };
    match feeder.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Ошибка чтения stdin: {}", e),
        Err(e) => error!("Задача чтения stdin завершилась аварийно: {}", e),
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "full" => registry.with(fmt_layer).init(),
        _ => registry.with(fmt_layer.compact()).init(),
    }

    Ok(())
}
