use crate::error::{Result, ShimError};
use crate::reconcile::{Reconciler, StreamState};
use crate::registry::ToolRegistry;
use crate::types::{Fragment, OutputFragment};
use futures_util::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

pub type OutputStream = Pin<Box<dyn Stream<Item = Result<OutputFragment>> + Send>>;

/// Wrap an upstream provider fragment stream into the normalized output
/// stream. Each call owns an independent `StreamState`; the only suspension
/// point is awaiting the next upstream fragment.
///
/// If upstream closes before a completion fragment arrives, the stream
/// yields `ShimError::StreamInterrupted` and ends; no completion is ever
/// fabricated. After any error the stream is fused.
#[tracing::instrument(level = "info", skip_all)]
pub fn reconcile_stream<S>(upstream: S, registry: ToolRegistry) -> OutputStream
where
    S: Stream<Item = Result<Fragment>> + Send + 'static,
{
    let reconciler = Reconciler::new(registry);
    let state = StreamState::new();
    let pending: VecDeque<OutputFragment> = VecDeque::new();

    let stream = futures_util::stream::unfold(
        (Box::pin(upstream), reconciler, state, pending, false),
        |(mut upstream, reconciler, mut state, mut pending, mut done)| async move {
            loop {
                if let Some(out) = pending.pop_front() {
                    return Some((Ok(out), (upstream, reconciler, state, pending, done)));
                }
                if done {
                    return None;
                }

                match upstream.next().await {
                    Some(Ok(fragment)) => match reconciler.process(fragment, &mut state) {
                        Ok(outputs) => {
                            pending.extend(outputs);
                            if state.is_complete() {
                                done = true;
                            }
                        }
                        Err(e) => {
                            done = true;
                            return Some((Err(e), (upstream, reconciler, state, pending, done)));
                        }
                    },
                    Some(Err(e)) => {
                        done = true;
                        return Some((Err(e), (upstream, reconciler, state, pending, done)));
                    }
                    None => {
                        done = true;
                        if state.is_complete() {
                            return None;
                        }
                        tracing::warn!("upstream closed before completion fragment");
                        return Some((
                            Err(ShimError::StreamInterrupted),
                            (upstream, reconciler, state, pending, done),
                        ));
                    }
                }
            }
        },
    );

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FinishReason;

    fn registry() -> ToolRegistry {
        ToolRegistry::new("json_response", vec!["get_weather".to_string()]).expect("valid")
    }

    fn upstream(fragments: Vec<Fragment>) -> impl Stream<Item = Result<Fragment>> + Send {
        futures_util::stream::iter(fragments.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn full_stream_reconciles_in_order() {
        let fragments = vec![
            Fragment::ToolCallStart {
                tool_call_id: "tc1".to_string(),
                tool_name: "json_response".to_string(),
            },
            Fragment::ToolCallDelta {
                tool_call_id: "tc1".to_string(),
                tool_name: "json_response".to_string(),
                payload: "{\"answer\":\"42\"}".to_string(),
            },
            Fragment::ToolCallEnd {
                tool_call_id: "tc1".to_string(),
                tool_name: "json_response".to_string(),
            },
            Fragment::Completion {
                reason: "tool_use".to_string(),
            },
        ];

        let mut stream = reconcile_stream(upstream(fragments), registry());
        let mut out = Vec::new();
        while let Some(item) = stream.next().await {
            out.push(item.expect("no error"));
        }

        assert_eq!(
            out,
            vec![
                OutputFragment::Content {
                    payload: "{\"answer\":\"42\"}".to_string()
                },
                OutputFragment::Completion {
                    finish_reason: FinishReason::Stop
                },
            ]
        );
    }

    #[tokio::test]
    async fn truncated_stream_raises_interrupted_without_completion() {
        let fragments = vec![
            Fragment::ToolCallStart {
                tool_call_id: "tc1".to_string(),
                tool_name: "get_weather".to_string(),
            },
            Fragment::ToolCallDelta {
                tool_call_id: "tc1".to_string(),
                tool_name: "get_weather".to_string(),
                payload: "{\"location\":".to_string(),
            },
            // No completion: upstream was cut off.
        ];

        let mut stream = reconcile_stream(upstream(fragments), registry());
        let mut outputs = Vec::new();
        let mut error = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(f) => outputs.push(f),
                Err(e) => error = Some(e),
            }
        }

        assert!(matches!(error, Some(ShimError::StreamInterrupted)));
        assert!(
            !outputs
                .iter()
                .any(|f| matches!(f, OutputFragment::Completion { .. }))
        );
    }

    #[tokio::test]
    async fn unknown_tool_halts_emission() {
        let fragments = vec![
            Fragment::Content {
                payload: "Let me check.".to_string(),
            },
            Fragment::ToolCallStart {
                tool_call_id: "tc1".to_string(),
                tool_name: "not_declared".to_string(),
            },
            Fragment::Completion {
                reason: "end_turn".to_string(),
            },
        ];

        let mut stream = reconcile_stream(upstream(fragments), registry());
        let first = stream.next().await.expect("first item").expect("content");
        assert_eq!(
            first,
            OutputFragment::Content {
                payload: "Let me check.".to_string()
            }
        );

        let err = stream.next().await.expect("second item").unwrap_err();
        assert!(matches!(err, ShimError::UnknownTool { name } if name == "not_declared"));

        // Fused after the error; the trailing completion is never emitted.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn upstream_error_is_forwarded_and_fuses() {
        let fragments: Vec<Result<Fragment>> = vec![
            Ok(Fragment::Content {
                payload: "hi".to_string(),
            }),
            Err(ShimError::Protocol("connection reset".to_string())),
            Ok(Fragment::Completion {
                reason: "end_turn".to_string(),
            }),
        ];

        let mut stream =
            reconcile_stream(futures_util::stream::iter(fragments.into_iter()), registry());
        assert!(stream.next().await.expect("content").is_ok());
        assert!(stream.next().await.expect("error").is_err());
        assert!(stream.next().await.is_none());
    }
}
