use std::fmt::Display;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use memchr::memchr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{ContinuationToken, GenerateChunk, GenerateRequest};
use crate::core::error::{StreamError, TransportError};
use crate::utils::url::construct_api_url;

/// One decoded object of a generation stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEvent {
    pub text: String,
    pub is_final: bool,
    /// Present only on the final event.
    pub continuation: Option<ContinuationToken>,
}

impl From<GenerateChunk> for TokenEvent {
    fn from(chunk: GenerateChunk) -> Self {
        let continuation = if chunk.done { chunk.context } else { None };
        Self {
            text: chunk.response,
            is_final: chunk.done,
            continuation,
        }
    }
}

/// Incremental newline-delimited JSON decoder.
///
/// Bytes are buffered until a full line is available, so chunk boundaries
/// never have to line up with line boundaries.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Decode the next complete line, skipping blank ones.
    pub fn next_event(&mut self) -> Option<Result<TokenEvent, TransportError>> {
        loop {
            let newline_pos = memchr(b'\n', &self.buffer)?;
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            match decode_line(&line[..newline_pos]) {
                Ok(None) => continue,
                Ok(Some(event)) => return Some(Ok(event)),
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Decode whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<Result<TokenEvent, TransportError>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest).transpose()
    }
}

fn decode_line(bytes: &[u8]) -> Result<Option<TokenEvent>, TransportError> {
    let line = std::str::from_utf8(bytes).map_err(|err| TransportError::Malformed {
        line: String::from_utf8_lossy(bytes).into_owned(),
        message: err.to_string(),
    })?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let chunk: GenerateChunk =
        serde_json::from_str(line).map_err(|err| TransportError::Malformed {
            line: line.to_string(),
            message: err.to_string(),
        })?;

    if let Some(message) = chunk.error {
        return Err(TransportError::Server { message });
    }

    Ok(Some(TokenEvent::from(chunk)))
}

type BodyStream<S> = Pin<Box<S>>;

struct TokenStreamState<S> {
    body: Option<BodyStream<S>>,
    decoder: NdjsonDecoder,
    cancel: CancellationToken,
    finished: bool,
}

enum BodyStep<T> {
    Cancelled,
    Next(Option<T>),
}

impl<S, B, E> TokenStreamState<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    async fn advance(&mut self) -> Option<Result<TokenEvent, StreamError>> {
        loop {
            if self.finished {
                return None;
            }
            if self.cancel.is_cancelled() {
                return Some(Err(self.terminate(StreamError::Cancelled)));
            }
            if let Some(decoded) = self.decoder.next_event() {
                return Some(self.emit(decoded));
            }

            let step = {
                let Some(body) = self.body.as_mut() else {
                    return Some(Err(self.terminate(TransportError::Disconnected.into())));
                };
                let cancel = &self.cancel;
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => BodyStep::Cancelled,
                    next = body.next() => BodyStep::Next(next),
                }
            };

            match step {
                BodyStep::Cancelled => {
                    return Some(Err(self.terminate(StreamError::Cancelled)))
                }
                BodyStep::Next(Some(Ok(chunk))) => self.decoder.push(chunk.as_ref()),
                BodyStep::Next(Some(Err(err))) => {
                    let err = TransportError::Request {
                        message: err.to_string(),
                    };
                    return Some(Err(self.terminate(err.into())));
                }
                BodyStep::Next(None) => {
                    self.body = None;
                    if let Some(decoded) = self.decoder.finish() {
                        return Some(self.emit(decoded));
                    }
                }
            }
        }
    }

    fn emit(
        &mut self,
        decoded: Result<TokenEvent, TransportError>,
    ) -> Result<TokenEvent, StreamError> {
        match decoded {
            Ok(event) => {
                if event.is_final {
                    self.finished = true;
                    self.body = None;
                }
                Ok(event)
            }
            Err(err) => Err(self.terminate(err.into())),
        }
    }

    fn terminate(&mut self, err: StreamError) -> StreamError {
        self.finished = true;
        // Dropping the body aborts the underlying connection.
        self.body = None;
        err
    }
}

/// Turn a raw response body into a lazy sequence of token events.
///
/// The sequence ends after the final event, after the first error, or with
/// [`StreamError::Cancelled`] as soon as `cancel` fires.
pub fn token_events<S, B, E>(
    body: S,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<TokenEvent, StreamError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = TokenStreamState {
        body: Some(Box::pin(body)),
        decoder: NdjsonDecoder::new(),
        cancel,
        finished: false,
    };
    futures_util::stream::unfold(state, |mut state| async move {
        let item = state.advance().await?;
        Some((item, state))
    })
}

/// Issue a generation request and return its token stream.
pub async fn generate(
    client: &reqwest::Client,
    host: &str,
    request: &GenerateRequest,
    cancel: CancellationToken,
) -> Result<impl Stream<Item = Result<TokenEvent, StreamError>>, StreamError> {
    let generate_url = construct_api_url(host, "api/generate");
    let send = client.post(generate_url).json(request).send();

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(StreamError::Cancelled),
        response = send => response.map_err(TransportError::from)?,
    };

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            body = response.text() => body.unwrap_or_else(|_| "<no body>".to_string()),
        };
        return Err(TransportError::Status { status, body }.into());
    }

    Ok(token_events(response.bytes_stream(), cancel))
}

#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Token(TokenEvent),
    Failed(TransportError),
    Cancelled,
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub host: String,
    pub request: GenerateRequest,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                host,
                request,
                cancel_token,
                stream_id,
            } = params;

            debug!(stream_id, model = %request.model, "Starting generation");
            let outcome = forward_generation(&client, &host, &request, cancel_token, |message| {
                let _ = tx.send((message, stream_id));
            })
            .await;
            debug!(stream_id, outcome = ?outcome, "Generation ended");
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenerationOutcome {
    Completed,
    Cancelled,
    Failed,
}

async fn forward_generation(
    client: &reqwest::Client,
    host: &str,
    request: &GenerateRequest,
    cancel: CancellationToken,
    mut send: impl FnMut(StreamMessage),
) -> GenerationOutcome {
    let stream = match generate(client, host, request, cancel).await {
        Ok(stream) => stream,
        Err(err) => return forward_error(err, &mut send),
    };
    forward_events(stream, send).await
}

async fn forward_events<S>(stream: S, mut send: impl FnMut(StreamMessage)) -> GenerationOutcome
where
    S: Stream<Item = Result<TokenEvent, StreamError>>,
{
    futures_util::pin_mut!(stream);
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => {
                let is_final = event.is_final;
                send(StreamMessage::Token(event));
                if is_final {
                    return GenerationOutcome::Completed;
                }
            }
            Err(err) => return forward_error(err, &mut send),
        }
    }
    GenerationOutcome::Failed
}

fn forward_error(err: StreamError, send: &mut impl FnMut(StreamMessage)) -> GenerationOutcome {
    match err {
        StreamError::Cancelled => {
            send(StreamMessage::Cancelled);
            GenerationOutcome::Cancelled
        }
        StreamError::Transport(err) => {
            send(StreamMessage::Failed(err));
            GenerationOutcome::Failed
        }
    }
}
