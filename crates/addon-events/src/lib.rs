mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Identifier of one descriptor run through the workflow.
pub type OperationId = u64;

/// Repository id as assigned by the package manager.
pub type RepositoryId = u64;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink() {
        let sink = NullSink;
        sink.emit(AddOnEvent::Log {
            level: LogLevel::Info,
            message: "test".to_string(),
        });
    }

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ChannelSink::new();
        sink.emit(AddOnEvent::Registration {
            op_id: 1,
            url: "cd:/?devices=/dev/sr0".to_string(),
            stage: RegistrationStage::Adding,
        });
        sink.emit(AddOnEvent::Registration {
            op_id: 1,
            url: "cd:/?devices=/dev/sr0".to_string(),
            stage: RegistrationStage::Added {
                repo_id: 3,
            },
        });
        sink.emit(AddOnEvent::AddOnIntegrated {
            op_id: 1,
            repo_id: 3,
            product: "sle-module-basesystem".to_string(),
        });

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[1],
            AddOnEvent::Registration {
                stage: RegistrationStage::Added {
                    repo_id: 3
                },
                ..
            }
        ));
        assert!(matches!(&events[2], AddOnEvent::AddOnIntegrated { .. }));
    }

    #[test]
    fn test_channel_sink_receiver_dropped() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(AddOnEvent::Log {
            level: LogLevel::Info,
            message: "orphaned".to_string(),
        });
    }

    #[test]
    fn test_collector_sink_reports() {
        let collector = Arc::new(CollectorSink::default());
        let sink: EventSinkHandle = collector.clone();
        assert!(collector.is_empty());

        sink.emit(AddOnEvent::Report {
            level: LogLevel::Error,
            message: "Product p2 not found on media.".to_string(),
        });
        sink.emit(AddOnEvent::Report {
            level: LogLevel::Warning,
            message: "network unreachable".to_string(),
        });
        sink.emit(AddOnEvent::Extension {
            op_id: 2,
            repo_id: 1,
            stage: ExtensionStage::ProductSelected("p1".to_string()),
        });

        assert_eq!(collector.len(), 3);
        assert_eq!(
            collector.reports(LogLevel::Error),
            vec!["Product p2 not found on media.".to_string()]
        );
        assert_eq!(collector.reports(LogLevel::Warning).len(), 1);
        assert!(collector.reports(LogLevel::Info).is_empty());
    }

    #[test]
    fn test_event_sink_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullSink>();
        assert_send_sync::<ChannelSink>();
        assert_send_sync::<CollectorSink>();
    }
}
