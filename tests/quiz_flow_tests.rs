use std::sync::Arc;

use quiz_gpt::clients::mock::{MockClient, MockHandle};
use quiz_gpt::retrieval::{Passage, StaticFetcher};
use quiz_gpt::{AppState, Difficulty, Outcome, QuizApp, QuizConfig, QuizError, QuizGenerator, Score};

const QUESTIONS: &str = "Question: Ocean color?\nAnswers: Red|Blue(o)";

const THREE_QUESTIONS: &str = r#"```json
{ "questions": [
  {"question":"Ocean color?","answers":[{"answer":"Red","correct":false},{"answer":"Blue","correct":true}]},
  {"question":"Capital of Korea?","answers":[{"answer":"Seoul","correct":true},{"answer":"Tokyo","correct":false}]},
  {"question":"Avatar release?","answers":[{"answer":"2007","correct":false},{"answer":"2009","correct":true}]}
] }
```"#;

fn app_with(fetcher: StaticFetcher) -> (QuizApp<MockClient, StaticFetcher>, Arc<MockHandle>) {
    let (client, handle) = MockClient::new();
    let config = QuizConfig::default().with_api_key("sk-test");
    let generator = QuizGenerator::new(client, &config);
    (QuizApp::new(config, generator, fetcher), handle)
}

fn ocean_fetcher() -> StaticFetcher {
    StaticFetcher::new().with_topic("ocean", vec![Passage::new("Ocean", "The ocean is blue.")])
}

#[tokio::test]
async fn perfect_score_then_retry_same_quiz() {
    let (mut app, handle) = app_with(ocean_fetcher());
    handle.push_response(QUESTIONS);
    handle.push_response(THREE_QUESTIONS);

    let AppState::Ready { mut session, difficulty, .. } = app.prepare("ocean").await else {
        panic!("expected a ready quiz");
    };
    assert_eq!(difficulty, Difficulty::Easy);

    session.select_answer(0, "Blue").unwrap();
    session.select_answer(1, "Seoul").unwrap();
    session.select_answer(2, "2009").unwrap();
    let score = session.submit();
    assert_eq!(score, Score { correct: 3, total: 3 });
    assert_eq!(score.outcome(), Outcome::Perfect);

    let quiz_before = session.quiz().clone();
    session.retry().unwrap();
    assert_eq!(session.quiz(), &quiz_before);
    assert_eq!(session.answered_count(), 0);
    assert_eq!(handle.call_count(), 2);
}

#[tokio::test]
async fn same_topic_and_difficulty_is_served_from_cache() {
    let fetcher = ocean_fetcher();
    let (mut app, handle) = app_with(fetcher.clone());
    handle.push_response(QUESTIONS);
    handle.push_response(THREE_QUESTIONS);

    assert!(matches!(app.prepare("ocean").await, AppState::Ready { .. }));
    assert!(matches!(app.prepare(" ocean ").await, AppState::Ready { .. }));

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(handle.call_count(), 2);
}

#[tokio::test]
async fn new_difficulty_generates_again_but_reuses_passages() {
    let fetcher = ocean_fetcher();
    let (mut app, handle) = app_with(fetcher.clone());
    for _ in 0..2 {
        handle.push_response(QUESTIONS);
        handle.push_response(THREE_QUESTIONS);
    }

    app.prepare("ocean").await;
    app.set_difficulty(Difficulty::Hard);
    let state = app.prepare("ocean").await;

    assert!(matches!(state, AppState::Ready { difficulty: Difficulty::Hard, .. }));
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(handle.call_count(), 4);
    assert!(handle.prompts()[2].contains("Make the questions very challenging."));
}

#[tokio::test]
async fn changing_topic_invalidates_the_previous_one() {
    let fetcher = ocean_fetcher().with_topic("space", vec![Passage::new("Space", "Space is dark.")]);
    let (mut app, handle) = app_with(fetcher.clone());
    for _ in 0..3 {
        handle.push_response(QUESTIONS);
        handle.push_response(THREE_QUESTIONS);
    }

    app.prepare("ocean").await;
    app.prepare("space").await;
    assert!(app.cache().passages("ocean").is_none());

    app.prepare("ocean").await;
    assert_eq!(fetcher.calls(), 3);
    assert_eq!(handle.call_count(), 6);
}

#[tokio::test]
async fn empty_context_is_idle_not_an_error() {
    let (mut app, handle) = app_with(StaticFetcher::new());

    let state = app.prepare("nothing here").await;
    assert!(matches!(state, AppState::NoContext { ref topic } if topic == "nothing here"));
    assert_eq!(handle.call_count(), 0);
}

#[tokio::test]
async fn parse_failure_is_reported_and_regenerate_calls_the_model_again() {
    let (mut app, handle) = app_with(ocean_fetcher());
    handle.push_response(QUESTIONS);
    handle.push_response("not json at all");
    handle.push_response(QUESTIONS);
    handle.push_response(THREE_QUESTIONS);

    let state = app.prepare("ocean").await;
    assert!(matches!(state, AppState::Failed(QuizError::Parse(_))));
    assert!(state.message().unwrap().contains("Quiz generation failed"));

    let state = app.regenerate("ocean").await;
    assert!(matches!(state, AppState::Ready { .. }));
    assert_eq!(handle.call_count(), 4);
}

#[tokio::test]
async fn empty_quiz_reports_no_questions() {
    let (mut app, handle) = app_with(ocean_fetcher());
    handle.push_response(QUESTIONS);
    handle.push_response("```json\n{\"questions\": []}\n```");

    let AppState::Ready { mut session, .. } = app.prepare("ocean").await else {
        panic!("expected a ready quiz");
    };
    let score = session.submit();
    assert_eq!(score, Score { correct: 0, total: 0 });
    assert_eq!(score.outcome(), Outcome::NoQuestions);
}

#[tokio::test]
async fn api_key_supplied_later_unblocks_generation() {
    let (client, handle) = MockClient::new();
    let config = QuizConfig::default();
    let generator = QuizGenerator::new(client, &config);
    let mut app = QuizApp::new(config, generator, ocean_fetcher());
    handle.push_response(QUESTIONS);
    handle.push_response(THREE_QUESTIONS);

    assert!(matches!(app.prepare("ocean").await, AppState::NeedsApiKey(_)));
    app.set_api_key("sk-test");
    assert!(matches!(app.prepare("ocean").await, AppState::Ready { .. }));
}
