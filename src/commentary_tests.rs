//! Unit tests for the commentary request model

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::commentary::{
        commentary_url, introduction_url, CommentaryRequest, Player, Trigger,
    };

    fn request(eval_change: Option<i32>) -> CommentaryRequest {
        CommentaryRequest {
            san_move: "Nxf7".to_string(),
            player: Player::White,
            evaluation: Some(120),
            eval_change,
            fen: Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string()),
            move_number: Some(12),
        }
    }

    fn query_map(url: &reqwest::Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_trigger_large_negative_swing_is_blunder() {
        assert_eq!(Trigger::classify(Some(-350)), Trigger::Blunder);
        assert_eq!(Trigger::classify(Some(-300)), Trigger::Blunder);
    }

    #[test]
    fn test_trigger_large_positive_swing_is_brilliant() {
        assert_eq!(Trigger::classify(Some(400)), Trigger::Brilliant);
        assert_eq!(Trigger::classify(Some(300)), Trigger::Brilliant);
    }

    #[test]
    fn test_trigger_moderate_swing_is_tactical() {
        assert_eq!(Trigger::classify(Some(150)), Trigger::Tactical);
        assert_eq!(Trigger::classify(Some(-299)), Trigger::Tactical);
        assert_eq!(Trigger::classify(Some(0)), Trigger::Tactical);
    }

    #[test]
    fn test_trigger_absent_swing_defaults_to_tactical() {
        assert_eq!(Trigger::classify(None), Trigger::Tactical);
    }

    #[test]
    fn test_commentary_url_carries_all_parameters() {
        let url = commentary_url("http://localhost:8000", &request(Some(-350))).unwrap();

        assert_eq!(url.path(), "/commentary");

        let query = query_map(&url);
        assert_eq!(query["san_move"], "Nxf7");
        assert_eq!(query["player"], "white");
        assert_eq!(query["evaluation"], "120");
        assert_eq!(query["eval_change"], "-350");
        assert_eq!(query["move_number"], "12");
        assert_eq!(query["trigger"], "BLUNDER");
        assert!(query["fen"].starts_with("rnbqkbnr"));
    }

    #[test]
    fn test_commentary_url_omits_absent_parameters() {
        let request = CommentaryRequest {
            san_move: "e4".to_string(),
            player: Player::Black,
            evaluation: None,
            eval_change: None,
            fen: None,
            move_number: None,
        };

        let url = commentary_url("http://localhost:8000/", &request).unwrap();
        let query = query_map(&url);

        assert_eq!(query["san_move"], "e4");
        assert_eq!(query["player"], "black");
        assert_eq!(query["trigger"], "TACTICAL");
        assert!(!query.contains_key("evaluation"));
        assert!(!query.contains_key("eval_change"));
        assert!(!query.contains_key("fen"));
        assert!(!query.contains_key("move_number"));
    }

    #[test]
    fn test_introduction_url_carries_both_agents() {
        let url = introduction_url("http://localhost:8000", "stockfish", "maia").unwrap();

        assert_eq!(url.path(), "/introduction");

        let query = query_map(&url);
        assert_eq!(query["white_agent"], "stockfish");
        assert_eq!(query["black_agent"], "maia");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(commentary_url("not a url", &request(None)).is_err());
    }
}
