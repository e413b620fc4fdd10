use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use trading_core::DepthUpdateEvent;

use crate::domain::{StreamData, StreamParser};

/// Default stream data parser that combines all available parsers
///
/// Infrastructure component that owns and orchestrates the parsing logic,
/// keeping the domain layer free of concrete parser dependencies.
pub struct StreamDataParser {
    parsers: Vec<Box<dyn StreamParser>>,
}

impl Default for StreamDataParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDataParser {
    /// Create a parser with the default set of parsers (Depth)
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(DepthParser)],
        }
    }

    /// Create a parser with custom parsers
    pub fn with_parsers(parsers: Vec<Box<dyn StreamParser>>) -> Self {
        Self { parsers }
    }

    pub fn add_parser(&mut self, parser: Box<dyn StreamParser>) {
        self.parsers.push(parser);
    }

    /// Parse a combined-stream payload (`{"stream": .., "data": ..}`)
    pub fn parse(&self, stream: &str, data: &Value) -> Option<StreamData> {
        let parser_refs: Vec<&dyn StreamParser> = self.parsers.iter().map(|p| p.as_ref()).collect();
        let result = StreamData::parse_with(stream, data, &parser_refs);

        if result.is_none() {
            debug!(
                stream = %stream,
                "No parser matched stream type - returning None"
            );
        }

        result
    }

    /// Parse a raw-stream payload, keyed by its event type (`e`)
    pub fn parse_raw(&self, data: &Value) -> Option<StreamData> {
        let event_type = data.get("e")?.as_str()?;
        self.parse(event_type, data)
    }
}

/// Parser for diff depth updates
/// Infrastructure component - handles Binance-format depth parsing
pub struct DepthParser;

impl StreamParser for DepthParser {
    fn can_parse(&self, stream: &str) -> bool {
        stream.to_lowercase().contains("@depth") || stream == "depthUpdate"
    }

    fn parse(&self, stream: &str, data: &Value) -> Option<StreamData> {
        match DepthUpdateEvent::deserialize(data) {
            Ok(event) => Some(StreamData::DepthUpdate(event)),
            Err(e) => {
                debug!(
                    stream = %stream,
                    data = %data,
                    error = %e,
                    "DepthParser: failed to parse depth update - missing or invalid fields"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_payload() -> Value {
        serde_json::json!({
            "e": "depthUpdate",
            "E": 1234567890,
            "s": "BTCUSDT",
            "U": 100,
            "u": 105,
            "b": [["50000.00", "1.5"], ["49999.00", "2.0"]],
            "a": [["50001.00", "1.0"]]
        })
    }

    #[test]
    fn test_depth_parser() {
        let parser = DepthParser;
        assert!(parser.can_parse("btcusdt@depth"));
        assert!(parser.can_parse("ETHUSDT@depth@100ms"));
        assert!(parser.can_parse("depthUpdate"));
        assert!(!parser.can_parse("btcusdt@trade"));

        let Some(StreamData::DepthUpdate(event)) = parser.parse("btcusdt@depth", &depth_payload())
        else {
            panic!("Expected DepthUpdate");
        };
        assert_eq!(event.symbol, "BTCUSDT");
        assert_eq!(event.first_update_id, 100);
        assert_eq!(event.final_update_id, 105);
        assert_eq!(event.bids.len(), 2);
        assert_eq!(event.asks.len(), 1);
    }

    #[test]
    fn test_depth_parser_rejects_missing_ids() {
        let data = serde_json::json!({"e": "depthUpdate", "s": "BTCUSDT", "b": [], "a": []});
        assert!(DepthParser.parse("btcusdt@depth", &data).is_none());
    }

    #[test]
    fn test_stream_data_parser() {
        let parser = StreamDataParser::new();

        let result = parser.parse("btcusdt@depth", &depth_payload());
        assert!(matches!(result, Some(StreamData::DepthUpdate(_))));

        let result = parser.parse("btcusdt@unknown", &serde_json::json!({}));
        assert!(result.is_none());
    }

    #[test]
    fn test_parse_raw_dispatches_on_event_type() {
        let parser = StreamDataParser::new();
        assert!(matches!(
            parser.parse_raw(&depth_payload()),
            Some(StreamData::DepthUpdate(_))
        ));
        assert!(parser.parse_raw(&serde_json::json!({"e": "trade"})).is_none());
        assert!(parser.parse_raw(&serde_json::json!({"result": null})).is_none());
    }

    #[test]
    fn test_stream_data_parser_extensibility() {
        struct KlineParser;
        impl StreamParser for KlineParser {
            fn can_parse(&self, stream: &str) -> bool {
                stream.to_lowercase().contains("@kline")
            }
            fn parse(&self, _stream: &str, _data: &Value) -> Option<StreamData> {
                None
            }
        }

        let mut parser = StreamDataParser::with_parsers(vec![]);
        assert!(parser.parse("btcusdt@depth", &depth_payload()).is_none());

        parser.add_parser(Box::new(KlineParser));
        parser.add_parser(Box::new(DepthParser));
        assert!(parser.parse("btcusdt@depth", &depth_payload()).is_some());
    }
}
