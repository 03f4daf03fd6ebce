use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use quiz_gpt::clients::mock::MockClient;
use quiz_gpt::clients::openai::models::OpenAIModel;
use quiz_gpt::clients::{OpenAIClient, OpenAIConfig};
use quiz_gpt::config::KeyFromEnv;
use quiz_gpt::core::LowLevelClient;
use quiz_gpt::interceptors::FileInterceptor;
use quiz_gpt::retrieval::{ContextFetcher, Passage, StaticFetcher, WikipediaConfig, WikipediaFetcher};
use quiz_gpt::{AppState, Difficulty, Feedback, Outcome, QuizApp, QuizConfig, QuizGenerator, QuizSession};

#[derive(Clone, Debug, ValueEnum)]
enum ClientType {
    Openai,
    Mock,
}

#[derive(Parser)]
#[command(author, version, about = "Quiz yourself on any topic with LLM-generated questions", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    OPENAI_API_KEY  API key for the OpenAI client (also read from .env)
    QUIZGPT_MODEL   Override the chat model id
    RUST_LOG        Log filter, e.g. quiz_gpt=debug

EXAMPLES:
    quizgpt --topic \"Roman Empire\"
    quizgpt --topic Volcanoes --difficulty hard --questions 5
    quizgpt --topic 이순신 --lang ko
    quizgpt --client mock --topic demo")]
struct Args {
    /// Quiz topic; asked interactively when omitted
    #[arg(short, long)]
    topic: Option<String>,

    /// Question difficulty
    #[arg(short, long, value_enum, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// Model backend
    #[arg(short, long, value_enum, default_value_t = ClientType::Openai)]
    client: ClientType,

    /// Chat model id (overrides QUIZGPT_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Number of questions to generate
    #[arg(short = 'n', long, default_value_t = 10)]
    questions: usize,

    /// Wikipedia language edition used for reference passages
    #[arg(long, default_value = "en")]
    lang: String,

    /// Language the questions must be written in; follows --lang when omitted
    #[arg(long)]
    language: Option<String>,

    /// Save every prompt and model response as markdown in this directory
    #[arg(long)]
    transcript_dir: Option<PathBuf>,
}

const DEMO_QUESTIONS: &str = "Question: What color is the ocean?\nAnswers: Red|Yellow|Green|Blue(o)";

const DEMO_FORMATTED: &str = r#"```json
{ "questions": [
    { "question": "What color is the ocean?",
      "answers": [
        { "answer": "Red", "correct": false },
        { "answer": "Yellow", "correct": false },
        { "answer": "Green", "correct": false },
        { "answer": "Blue", "correct": true }
      ] },
    { "question": "What is the capital of Korea?",
      "answers": [
        { "answer": "Bangkok", "correct": false },
        { "answer": "Seoul", "correct": true },
        { "answer": "New York", "correct": false },
        { "answer": "Tokyo", "correct": false }
      ] }
] }
```"#;

/// English name of a Wikipedia language edition, for the question prompt.
fn language_name(code: &str) -> Option<&'static str> {
    Some(match code.to_ascii_lowercase().as_str() {
        "en" => "English",
        "ko" => "Korean",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        _ => return None,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Read one trimmed line; `None` on end of input.
fn prompt_line(message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn confirm(message: &str) -> io::Result<bool> {
    Ok(prompt_line(&format!("{} (y/N): ", message))?
        .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
}

fn ask_topic() -> io::Result<Option<String>> {
    Ok(prompt_line("Quiz topic (empty to quit): ")?.filter(|topic| !topic.is_empty()))
}

fn build_client(args: &Args, config: &QuizConfig) -> Result<Box<dyn LowLevelClient>> {
    Ok(match args.client {
        ClientType::Openai => Box::new(OpenAIClient::new(OpenAIConfig::from_quiz_config(config)?)),
        ClientType::Mock => {
            let (client, handle) = MockClient::new();
            handle.push_response(DEMO_QUESTIONS);
            handle.push_response(DEMO_FORMATTED);
            Box::new(client)
        }
    })
}

fn build_fetcher(args: &Args, config: &QuizConfig) -> Box<dyn ContextFetcher> {
    match args.client {
        ClientType::Openai => Box::new(WikipediaFetcher::new(WikipediaConfig {
            lang: args.lang.clone(),
            top_k_results: config.top_k_results,
            ..WikipediaConfig::default()
        })),
        ClientType::Mock => {
            let topic = args.topic.clone().unwrap_or_else(|| "demo".to_string());
            Box::new(StaticFetcher::new().with_topic(
                topic,
                vec![Passage::new("Demo", "The ocean is blue. Seoul is the capital of Korea.")],
            ))
        }
    }
}

fn render_question(session: &QuizSession, index: usize) {
    let Some(question) = session.quiz().question(index) else {
        return;
    };
    println!("\n{}. {}", index + 1, question.prompt());
    for (i, answer) in question.answers().iter().enumerate() {
        println!("   {}) {}", i + 1, answer.text());
    }
}

/// Collect one selection per question, then submit. Returns false on end of input.
fn run_attempt(session: &mut QuizSession) -> Result<bool> {
    for index in 0..session.quiz().len() {
        render_question(session, index);
        let options: Vec<String> = session.quiz().questions()[index]
            .answers()
            .iter()
            .map(|a| a.text().to_string())
            .collect();

        loop {
            let Some(input) = prompt_line("   Your answer (number, empty to skip): ")? else {
                return Ok(false);
            };
            if input.is_empty() {
                break;
            }
            match input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|n| options.get(n)) {
                Some(text) => {
                    session.select_answer(index, text)?;
                    match session.feedback(index) {
                        Some(Feedback::Correct) => println!("   Correct!"),
                        Some(Feedback::Wrong) => println!("   Wrong!"),
                        None => {}
                    }
                    break;
                }
                None => println!("   Please enter a number between 1 and {}.", options.len()),
            }
        }
    }

    let score = session.submit();
    match score.outcome() {
        Outcome::Perfect => println!("\nCongratulations! Perfect score! {}", score),
        Outcome::Partial => println!("\nYou got {} correct. Give it another try!", score),
        Outcome::NoQuestions => println!("\nThe generated quiz has no questions. Try regenerating or another topic."),
    }
    Ok(true)
}

/// Answer the quiz, offering a retry after every submission.
fn run_session(mut session: QuizSession) -> Result<()> {
    loop {
        if !run_attempt(&mut session)? {
            return Ok(());
        }
        if !confirm("Try again?")? {
            return Ok(());
        }
        session.retry()?;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = QuizConfig::from_env()
        .with_difficulty(args.difficulty)
        .with_question_count(args.questions);
    if let Some(model) = &args.model {
        config.model = OpenAIModel::from_id(model);
    }
    config.language = args
        .language
        .clone()
        .or_else(|| language_name(&args.lang).map(str::to_string));
    match args.client {
        ClientType::Openai if config.api_key.is_none() => {
            config.api_key = Some(QuizConfig::find_key_with_user()?);
        }
        ClientType::Mock => config.api_key = Some("mock".to_string()),
        _ => {}
    }

    let mut generator = QuizGenerator::new(build_client(&args, &config)?, &config);
    if let Some(dir) = &args.transcript_dir {
        generator = generator.with_interceptor(Arc::new(FileInterceptor::new(dir.clone())));
    }
    let fetcher = build_fetcher(&args, &config);
    let mut app = QuizApp::new(config, generator, fetcher);

    println!("QuizGPT: difficulty {}", app.config().difficulty);
    let mut topic = match args.topic.clone() {
        Some(topic) => topic,
        None => match ask_topic()? {
            Some(topic) => topic,
            None => return Ok(()),
        },
    };

    let mut state = app.prepare(&topic).await;
    loop {
        match state {
            AppState::Ready { session, .. } => run_session(session)?,
            AppState::NeedsApiKey(msg) => bail!(msg),
            other => {
                let failed = matches!(other, AppState::Failed(_));
                if let Some(msg) = other.message() {
                    if failed {
                        eprintln!("{}", msg);
                    } else {
                        println!("{}", msg);
                    }
                }
                if failed && confirm("Regenerate the quiz?")? {
                    state = app.regenerate(&topic).await;
                    continue;
                }
            }
        }

        topic = match ask_topic()? {
            Some(topic) => topic,
            None => return Ok(()),
        };
        state = app.prepare(&topic).await;
    }
}
