//! 日志系统：文件 + 控制台 + TUI 广播三路输出，退出时归档。

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::{io, panic, thread, time::Duration};

use crossterm::event::DisableMouseCapture;
use crossterm::execute;
use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{error, info};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use zip::CompressionMethod;
use zip::write::FileOptions;

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024; // 10MB
const ARCHIVE_WAIT_MS: u64 = 500;
const LATEST_LOG: &str = "latest.log";

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,
    #[error("subscriber init failed: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("time formatting failed: {0}")]
    Time(#[from] time::error::Format),
}

#[derive(Clone, Copy, Debug)]
pub struct LogOptions {
    pub debug: bool,
    pub use_color: bool,
    pub archive_on_exit: bool,
    pub console: bool,
    pub broadcast_to_ui: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            debug: false,
            use_color: true,
            archive_on_exit: true,
            console: false,
            broadcast_to_ui: true,
        }
    }
}

type LogChannel = (
    crossbeam_channel::Sender<String>,
    crossbeam_channel::Receiver<String>,
);

static LOG_CHANNEL: OnceLock<LogChannel> = OnceLock::new();

/// TUI 日志框从这里读取格式化后的日志行。
pub fn take_broadcast_rx() -> Option<crossbeam_channel::Receiver<String>> {
    LOG_CHANNEL.get().map(|(_, rx)| rx.clone())
}

#[derive(Clone)]
struct ChannelWriter {
    tx: crossbeam_channel::Sender<String>,
}

impl io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.tx.send(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for ChannelWriter {
    type Writer = ChannelWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub struct LogSystem {
    runtime: Arc<LogRuntime>,
}

impl LogSystem {
    /// 在 `base_dir/logs`（默认当前目录）下初始化日志。
    pub fn init_with_base(options: LogOptions, base_dir: Option<&Path>) -> Result<Self, LogError> {
        let logs_dir = base_dir
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
        fs::create_dir_all(&logs_dir)?;
        let latest_log = logs_dir.join(LATEST_LOG);

        if fs::metadata(&latest_log).is_ok_and(|m| m.len() >= MAX_LOG_BYTES) {
            archive_log_file(&latest_log, &logs_dir)?;
        }

        let file_appender = rolling::never(&logs_dir, LATEST_LOG);
        let (file_writer, guard) = non_blocking::NonBlockingBuilder::default()
            .lossy(false)
            .finish(file_appender);

        let level = if options.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        let console_writer = if options.console {
            BoxMakeWriter::new(io::stderr)
        } else {
            BoxMakeWriter::new(io::sink)
        };
        let console_layer = fmt::layer()
            .with_target(false)
            .with_ansi(options.use_color)
            .with_writer(console_writer)
            .with_filter(level);

        let broadcast_layer = options.broadcast_to_ui.then(|| {
            let (tx, _) = LOG_CHANNEL.get_or_init(crossbeam_channel::unbounded).clone();
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(ChannelWriter { tx })
                .with_filter(level)
        });

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(false)
            .with_writer(file_writer)
            .with_filter(LevelFilter::DEBUG);

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .with(broadcast_layer)
            .try_init()
            .map_err(|e| {
                if e.to_string().contains("global") {
                    LogError::AlreadyInitialized
                } else {
                    LogError::SubscriberInit(e)
                }
            })?;

        let runtime = Arc::new(LogRuntime {
            logs_dir,
            latest_log,
            guard: Mutex::new(Some(guard)),
            exit_called: AtomicBool::new(false),
            archive_on_exit: options.archive_on_exit,
        });
        runtime.install_signal_handler();
        runtime.install_panic_hook();

        Ok(Self { runtime })
    }

    pub fn logs_dir(&self) -> &Path {
        &self.runtime.logs_dir
    }
}

impl Drop for LogSystem {
    fn drop(&mut self) {
        self.runtime.safe_exit();
    }
}

struct LogRuntime {
    logs_dir: PathBuf,
    latest_log: PathBuf,
    guard: Mutex<Option<WorkerGuard>>,
    exit_called: AtomicBool,
    archive_on_exit: bool,
}

impl LogRuntime {
    fn install_signal_handler(self: &Arc<Self>) {
        let runtime = Arc::clone(self);
        let _ = ctrlc::set_handler(move || {
            // TUI 处于 raw mode 时直接退出会让终端失去回显
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
            runtime.safe_exit();
            std::process::exit(0);
        });
    }

    fn install_panic_hook(self: &Arc<Self>) {
        let runtime = Arc::clone(self);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            match info.location() {
                Some(loc) => error!("panic at {}:{}: {}", loc.file(), loc.line(), info),
                None => error!("panic: {info}"),
            }
            runtime.safe_exit();
            previous(info);
        }));
    }

    fn safe_exit(&self) {
        if self.exit_called.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut guard) = self.guard.lock() {
            guard.take();
        }
        if !self.archive_on_exit {
            return;
        }
        thread::sleep(Duration::from_millis(ARCHIVE_WAIT_MS));
        if let Err(err) = archive_log_file(&self.latest_log, &self.logs_dir) {
            eprintln!("failed to archive log: {err}");
        }
    }
}

/// 把 `latest.log` 压缩成 `log_<时间戳>.zip` 并删除原文件；空文件直接删除。
fn archive_log_file(latest_log: &Path, logs_dir: &Path) -> Result<Option<PathBuf>, LogError> {
    let Ok(meta) = fs::metadata(latest_log) else {
        return Ok(None);
    };
    if meta.len() == 0 {
        let _ = fs::remove_file(latest_log);
        return Ok(None);
    }

    let timestamp = OffsetDateTime::now_utc().format(format_description!(
        "[year][month][day]_[hour][minute][second]"
    ))?;
    let archive_path = logs_dir.join(format!("log_{timestamp}.zip"));

    let mut zip = zip::ZipWriter::new(File::create(&archive_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(format!("{timestamp}.log"), options)?;
    io::copy(&mut File::open(latest_log)?, &mut zip)?;
    zip.finish()?;

    let _ = fs::remove_file(latest_log);
    info!("log archived to {}", archive_path.display());
    Ok(Some(archive_path))
}
