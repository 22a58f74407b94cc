use dotenv::dotenv;
use financial_statement_analyzer::llm::{ChatSession, FinancialAssistant, GeminiClient};
use financial_statement_analyzer::{AnalyzerConfig, RawCell, RawTable, StatementAnalyzer};
use std::error::Error;
use std::io::{self, Write};

/// Reads a three-column CSV (label, prior, current) with a header row.
fn load_statement(path: &str) -> Result<RawTable, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawTable::new(rows))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: statement_chat <statement.csv>")?;

    let config = AnalyzerConfig::default();
    let raw = load_statement(&path)?;

    let mut analyzer = StatementAnalyzer::new(&config);
    let analysis = match analyzer.analyze(&raw) {
        Ok(analysis) => analysis,
        Err(e) if e.is_data_structure_error() => {
            eprintln!("❌ Data structure error: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("📊 Growth & composition\n");
    println!("{}", analysis.table().to_markdown());
    println!("📈 Liquidity\n");
    println!("{}", analysis.ratios().to_markdown());
    if let Some(change) = analysis.ratios().current_ratio_change() {
        println!("Current ratio change: {:+.2}\n", change);
    }
    for warning in analysis.warnings() {
        println!("⚠️  {}", warning);
    }

    let client = match GeminiClient::from_secret(std::env::var("GEMINI_API_KEY").ok(), &config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}. Set GEMINI_API_KEY to enable the assistant.", e);
            return Ok(());
        }
    };

    println!("\nWaiting for Gemini to analyse the statement...");
    let assistant = FinancialAssistant::new(client.clone(), &config);
    match assistant.generate_narrative(&analysis).await {
        Ok(narrative) => println!("\n{}\n", narrative),
        Err(e) => eprintln!("❌ {}", e),
    }

    let mut session = ChatSession::from_config(client, &config);
    session.attach_analysis(&analysis);

    println!("🤖 {}", session.conversation().greeting().text);
    println!("(type 'quit' to exit)");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        if prompt.is_empty() {
            continue;
        }

        println!("\nThinking...");

        match session.ask(prompt).await {
            Ok(response) => {
                println!("\n{}\n", response);
                println!("------------------------------------------------------------------");
            }
            Err(e) => {
                eprintln!("❌ Error: {}", e);
                session.record_placeholder(format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
