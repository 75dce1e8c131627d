use std::sync::{mpsc, Arc};
use std::thread;

use zenread_logging::{reader_debug, reader_error};

use crate::pipeline::ArticlePipeline;
use crate::summarize::{SummaryRequest, SummaryStyle, Summarizer};
use crate::{EngineEvent, RequestId};

enum EngineCommand {
    FetchArticle {
        request_id: RequestId,
        url: String,
    },
    Summarize {
        request_id: RequestId,
        request: SummaryRequest,
    },
    SummarizeBatch {
        request_id: RequestId,
        content: String,
        title: Option<String>,
        styles: Vec<SummaryStyle>,
    },
}

/// Runs the pipeline and summarizer on a background Tokio runtime.
///
/// Commands are fire-and-forget; completions arrive as [`EngineEvent`]s.
/// Nothing is cancelled, so callers match events by request id.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<std::sync::Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(pipeline: ArticlePipeline, summarizer: Arc<Summarizer>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let pipeline = Arc::new(pipeline);

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    reader_error!("engine runtime failed to start: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let pipeline = pipeline.clone();
                let summarizer = summarizer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&pipeline, &summarizer, command, event_tx).await;
                });
            }
            reader_debug!("engine command channel closed");
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(std::sync::Mutex::new(event_rx)),
        }
    }

    pub fn fetch_article(&self, request_id: RequestId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchArticle {
            request_id,
            url: url.into(),
        });
    }

    pub fn summarize(&self, request_id: RequestId, request: SummaryRequest) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Summarize { request_id, request });
    }

    /// Emits one `SummaryReady` per style, all sharing `request_id`.
    pub fn summarize_batch(
        &self,
        request_id: RequestId,
        content: String,
        title: Option<String>,
        styles: Vec<SummaryStyle>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::SummarizeBatch {
            request_id,
            content,
            title,
            styles,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    pipeline: &ArticlePipeline,
    summarizer: &Summarizer,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::FetchArticle { request_id, url } => {
            let result = pipeline.parse(&url).await;
            let _ = event_tx.send(EngineEvent::ArticleReady { request_id, result });
        }
        EngineCommand::Summarize {
            request_id,
            request,
        } => {
            let result = summarizer.summarize(&request).await;
            let _ = event_tx.send(EngineEvent::SummaryReady { request_id, result });
        }
        EngineCommand::SummarizeBatch {
            request_id,
            content,
            title,
            styles,
        } => {
            let results = summarizer
                .summarize_batch(&content, title.as_deref(), &styles)
                .await;
            for result in results {
                let _ = event_tx.send(EngineEvent::SummaryReady { request_id, result });
            }
        }
    }
}
