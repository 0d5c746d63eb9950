mod common;

use common::{call, fake_executor, fake_registry, Event, RecordingPresenter, ScriptedModel, Step};
use quickask::delivery::{Artifact, Delivery};
use quickask::models::{Conversation, Role, ToolOutput, TurnContent};
use quickask::orchestrator::{Orchestrator, QueryOutcome};
use quickask::tools::ToolExecutor;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn ask(
    orchestrator: &Orchestrator<'_>,
    conversation: &mut Conversation,
    query: &str,
) -> (QueryOutcome, RecordingPresenter) {
    let presenter = RecordingPresenter::default();
    let mut handle = presenter.clone();
    let cancel = CancellationToken::new();
    let mut delivery = Delivery::new(&mut handle, cancel.clone());
    let outcome = orchestrator
        .run(conversation, query, &mut delivery, &cancel)
        .await;
    (outcome, presenter)
}

#[tokio::test]
async fn test_answer_without_tools_takes_one_round() {
    let model = ScriptedModel::new(vec![Step::Text("Hello there")]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "hi").await;

    assert_eq!(
        outcome,
        QueryOutcome::Done {
            answer: "Hello there".to_string(),
            rounds: 1
        }
    );
    assert_eq!(model.calls(), 1);
    assert_eq!(presenter.text(), "Hello there");
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.turns()[0].role, Role::User);
    assert_eq!(conversation.turns()[1].role, Role::Model);
}

#[tokio::test]
async fn test_weather_in_paris() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("call_1", "getWeather", json!({ "location": "paris" }))]),
        Step::Text("## Paris\n12°C, cloudy"),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) =
        ask(&orchestrator, &mut conversation, "what's the weather in paris").await;

    assert!(outcome.is_done());
    assert_eq!(outcome.rounds(), 2);
    assert_eq!(model.calls(), 2);
    assert_eq!(presenter.text(), "## Paris\n12°C, cloudy");

    let TurnContent::ToolResult(result) = &conversation.turns()[2].content else {
        panic!("expected a tool result turn");
    };
    assert_eq!(result.call_id, "call_1");
    assert_eq!(
        result.envelope(),
        json!({ "tool": "getWeather", "result": { "temp": 12, "condition": "cloudy" } })
    );
}

#[tokio::test]
async fn test_turns_accumulate_in_round_order() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![
            call("a", "getWeather", json!({ "location": "oslo" })),
            call("b", "getDateAndTime", json!({})),
        ]),
        Step::Calls(vec![call("c", "getDateAndTime", json!({}))]),
        Step::Text("done"),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, _) = ask(&orchestrator, &mut conversation, "plan my day").await;

    assert_eq!(outcome.rounds(), 3);
    // 1 user + 3 model + (2 + 1) results
    assert_eq!(conversation.len(), 7);
    assert_eq!(conversation.count_role(Role::User), 1);
    assert_eq!(conversation.count_role(Role::Model), 3);
    assert_eq!(conversation.count_role(Role::ToolResult), 3);

    let roles: Vec<Role> = conversation.turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Model,
            Role::ToolResult,
            Role::ToolResult,
            Role::Model,
            Role::ToolResult,
            Role::Model,
        ]
    );
    let answered: Vec<&str> = conversation
        .turns()
        .iter()
        .filter_map(|t| t.answers_call())
        .collect();
    assert_eq!(answered, vec!["a", "b", "c"]);

    // The model sees the whole history every round
    assert_eq!(model.seen_turns(), vec![1, 4, 6]);
    assert!(conversation.pending_calls().is_empty());
}

#[tokio::test]
async fn test_model_timeout_fails_with_user_turn_only() {
    let model = ScriptedModel::new(vec![Step::Timeout("no data received for 30 seconds")]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "xyz").await;

    let expected = "Error: Request timeout: no data received for 30 seconds";
    assert_eq!(
        outcome,
        QueryOutcome::Failed {
            message: expected.to_string(),
            rounds: 1
        }
    );
    assert_eq!(presenter.text(), expected);
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation.turns()[0].role, Role::User);
}

#[tokio::test]
async fn test_error_after_partial_stream_starts_on_a_new_line() {
    let model = ScriptedModel::new(vec![Step::StreamThenTimeout(
        vec!["Looking that up"],
        "no data received for 30 seconds",
    )]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "weather?").await;

    assert!(matches!(outcome, QueryOutcome::Failed { rounds: 1, .. }));
    assert_eq!(
        presenter.events(),
        vec![
            Event::Text("Looking that up".to_string()),
            Event::Text("\n".to_string()),
            Event::Text("Error: Request timeout: no data received for 30 seconds".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_failing_tool_is_reported_to_the_model() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("x", "broken", json!({}))]),
        Step::Text("The service is down."),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "try it").await;

    assert!(outcome.is_done());
    let TurnContent::ToolResult(result) = &conversation.turns()[2].content else {
        panic!("expected a tool result turn");
    };
    assert!(result.is_error());
    assert_eq!(
        result.envelope(),
        json!({ "tool": "broken", "result": { "error": "upstream returned 500" } })
    );
    assert!(presenter.events().contains(&Event::Artifact(Artifact::ToolStatus {
        tool: "broken".to_string(),
        ok: false,
        detail: "upstream returned 500".to_string(),
    })));
}

#[tokio::test]
async fn test_unknown_tool_does_not_end_the_loop() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("x", "launchRocket", json!({}))]),
        Step::Text("I can't do that."),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, _) = ask(&orchestrator, &mut conversation, "launch").await;

    assert!(outcome.is_done());
    let TurnContent::ToolResult(result) = &conversation.turns()[2].content else {
        panic!("expected a tool result turn");
    };
    assert_eq!(
        result.outcome,
        Err("Tool 'launchRocket' not found".to_string())
    );
}

#[tokio::test]
async fn test_invalid_arguments_become_tool_errors() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![
            call("a", "getWeather", json!({})),
            call("b", "getWeather", json!("{location: paris")),
        ]),
        Step::Text("ok"),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    ask(&orchestrator, &mut conversation, "weather").await;

    let errors: Vec<String> = conversation
        .turns()
        .iter()
        .filter_map(|t| match &t.content {
            TurnContent::ToolResult(r) => r.outcome.clone().err(),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].starts_with("Invalid arguments:"));
    assert!(errors[0].contains("location"));
    assert!(errors[1].starts_with("failed to parse arguments for tool 'getWeather'"));
}

#[tokio::test]
async fn test_image_result_becomes_user_turn() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("shot", "takeScreenshot", json!({}))]),
        Step::Text("You have an editor open."),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "what's on my screen").await;

    assert!(outcome.is_done());
    assert_eq!(conversation.len(), 4);
    assert_eq!(model.seen_turns(), vec![1, 3]);
    let image_turn = &conversation.turns()[2];
    assert_eq!(image_turn.role, Role::User);
    assert_eq!(image_turn.answers_call(), Some("shot"));
    let TurnContent::Image { tool, image, .. } = &image_turn.content else {
        panic!("expected an image turn");
    };
    assert_eq!(tool, "takeScreenshot");
    assert_eq!(image.mime_type, "image/png");

    assert!(presenter
        .events()
        .iter()
        .any(|e| matches!(e, Event::Artifact(Artifact::Image { tool, .. }) if tool == "takeScreenshot")));
}

#[tokio::test]
async fn test_round_cap_fails_the_query() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("1", "getDateAndTime", json!({}))]),
        Step::Calls(vec![call("2", "getDateAndTime", json!({}))]),
        Step::Calls(vec![call("3", "getDateAndTime", json!({}))]),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 2);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "loop forever").await;

    assert_eq!(model.calls(), 2);
    assert_eq!(
        outcome,
        QueryOutcome::Failed {
            message: "Error: too many tool iterations (2)".to_string(),
            rounds: 2
        }
    );
    assert_eq!(presenter.text(), "Error: too many tool iterations (2)");
}

#[tokio::test]
async fn test_slow_tool_times_out_without_blocking_siblings() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![
            call("s", "slow", json!({})),
            call("d", "getDateAndTime", json!({})),
        ]),
        Step::Text("partial answer"),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let started = std::time::Instant::now();
    let (outcome, _) = ask(&orchestrator, &mut conversation, "both").await;

    assert!(outcome.is_done());
    assert!(started.elapsed() < Duration::from_secs(3));
    let TurnContent::ToolResult(slow) = &conversation.turns()[2].content else {
        panic!("expected a tool result turn");
    };
    assert!(slow.outcome.as_ref().unwrap_err().contains("timed out"));
    let TurnContent::ToolResult(date) = &conversation.turns()[3].content else {
        panic!("expected a tool result turn");
    };
    assert!(matches!(date.outcome, Ok(ToolOutput::Data(_))));
}

#[tokio::test]
async fn test_streamed_text_is_delivered_once() {
    let model = ScriptedModel::new(vec![Step::Stream(vec!["Hel", "lo ", "world"])]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    let (outcome, presenter) = ask(&orchestrator, &mut conversation, "greet").await;

    assert_eq!(
        outcome,
        QueryOutcome::Done {
            answer: "Hello world".to_string(),
            rounds: 1
        }
    );
    assert_eq!(
        presenter.events(),
        vec![
            Event::Text("Hel".to_string()),
            Event::Text("lo ".to_string()),
            Event::Text("world".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_cancellation_stops_a_pending_model_call() {
    let model = ScriptedModel::new(vec![Step::Hang]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();
    let mut presenter = RecordingPresenter::default();
    let recorded = presenter.clone();
    let cancel = CancellationToken::new();

    let mut delivery = Delivery::new(&mut presenter, cancel.clone());
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    };
    let (outcome, _) = tokio::join!(
        orchestrator.run(&mut conversation, "never mind", &mut delivery, &cancel),
        canceller
    );

    assert_eq!(outcome, QueryOutcome::Cancelled { rounds: 1 });
    assert!(recorded.events().is_empty());
}

#[tokio::test]
async fn test_cancellation_stops_running_tools() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("1", "slow", json!({}))]),
        Step::Text("unreachable"),
    ]);
    let executor = ToolExecutor::new(Arc::new(fake_registry()), Duration::from_secs(10));
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();
    let mut presenter = RecordingPresenter::default();
    let recorded = presenter.clone();
    let cancel = CancellationToken::new();

    let mut delivery = Delivery::new(&mut presenter, cancel.clone());
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    };
    let (outcome, _) = tokio::join!(
        orchestrator.run(&mut conversation, "take your time", &mut delivery, &cancel),
        canceller
    );

    assert_eq!(outcome, QueryOutcome::Cancelled { rounds: 1 });
    assert!(recorded.events().is_empty());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_all_tools_offered_every_round() {
    let model = ScriptedModel::new(vec![
        Step::Calls(vec![call("1", "getDateAndTime", json!({}))]),
        Step::Text("It is morning."),
    ]);
    let executor = fake_executor();
    let orchestrator = Orchestrator::new(&model, &executor, 8);
    let mut conversation = Conversation::new();

    ask(&orchestrator, &mut conversation, "time?").await;

    let expected: Vec<String> = ["getWeather", "getDateAndTime", "broken", "takeScreenshot", "slow"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(model.seen_tools(), vec![expected.clone(), expected]);
}
