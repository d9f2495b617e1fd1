use error_stack::{Result, ResultExt};
use std::io::IsTerminal;
use thiserror::Error;
use tracing::{Event, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::{Compact, Format, Full, Pretty, Writer};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{Logging, LoggingStyle};

#[derive(Debug, Error)]
#[error("Failed to initialize logging")]
pub struct TelemetryInitError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Installs the global tracing subscriber.
pub fn init(config: &Logging) -> Result<(), TelemetryInitError> {
    let filter = EnvFilter::try_new(&config.targets)
        .change_context(TelemetryInitError)
        .attach_printable_lazy(|| format!("invalid logging targets: {:?}", config.targets))?;

    let ansi = std::io::stderr().is_terminal();
    let layer: Box<dyn Layer<Registry> + Send + Sync> =
        match Formatter::from_style(&config.style, ansi) {
            Some(formatter) => fmt::layer()
                .with_ansi(ansi)
                .with_writer(std::io::stderr)
                .event_format(formatter)
                .boxed(),
            None => fmt::layer()
                .json()
                .with_timer(ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
                .with_writer(std::io::stderr)
                .boxed(),
        };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .with(ErrorLayer::default())
        .try_init()
        .change_context(TelemetryInitError)
}

pub enum Formatter {
    Full(Format<Full, ChronoUtc>),
    Pretty(Format<Pretty, ChronoUtc>),
    Compact(Format<Compact, ChronoUtc>),
}

impl Formatter {
    #[must_use]
    pub fn from_style(style: &LoggingStyle, ansi: bool) -> Option<Self> {
        let default = fmt::format().with_timer(ChronoUtc::new(TIMESTAMP_FORMAT.to_string()));
        match style {
            LoggingStyle::Compact => Some(Self::Compact(default.compact().with_ansi(ansi))),
            LoggingStyle::Full => Some(Self::Full(default.with_ansi(ansi))),
            LoggingStyle::Pretty => Some(Self::Pretty(default.pretty().with_ansi(ansi))),
            LoggingStyle::JSON => None,
        }
    }
}

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        match self {
            Formatter::Full(fmt) => fmt.format_event(ctx, writer, event),
            Formatter::Pretty(fmt) => fmt.format_event(ctx, writer, event),
            Formatter::Compact(fmt) => fmt.format_event(ctx, writer, event),
        }
    }
}
