//! Command-line front end: one subcommand per screen action of the shell.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use savoir_vin_client::{
    config::{API_BASE_ENV, SESSION_PATH_ENV},
    dao::http::HttpScoringApi,
    dto::{
        evaluation::AnswerKeyItem,
        origin::{Country, Grape},
        results::ParticipantResults,
        round::UpdateRoundRequest,
        scale::scale_label,
    },
    error::FlowError,
    services::{
        catalog_service,
        evaluation_service::EvaluationFlow,
        results_service::{self, EventStandings},
        shell_service::AppShell,
    },
    state::{
        form::EvaluationForm,
        shell::{ParticipantView, SommelierView, View},
        state_machine::{FormPhase, Snapshot},
    },
};

#[derive(Parser)]
#[command(name = "savoir-vin")]
#[command(about = "Savoir-Vin blind tasting client", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the scoring API.
    #[arg(long, global = true, env = "SAVOIR_VIN_API_BASE")]
    pub api_base: Option<String>,

    /// File holding the signed-in identity and the evaluation draft.
    #[arg(long, global = true, env = "SAVOIR_VIN_SESSION_PATH")]
    pub session: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Value of a configuration override given on the command line.
    pub fn override_for(&self, key: &str) -> Option<String> {
        match key {
            API_BASE_ENV => self.api_base.clone(),
            SESSION_PATH_ENV => self
                .session
                .as_ref()
                .map(|path| path.display().to_string()),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in as the organizer.
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Join an event as a participant.
    Join {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
    },
    Logout,
    /// Show the signed-in identity and the current screen.
    Whoami,
    #[command(subcommand)]
    Events(EventCommand),
    #[command(subcommand)]
    Rounds(RoundCommand),
    Ranking {
        event: Uuid,
    },
    Winner {
        event: Uuid,
    },
    /// Print the organizer's reference answers of an event.
    AnswerKey {
        event: Uuid,
    },
    /// Answer the next pending round.
    Evaluate(EvaluateArgs),
    /// Close an event once every round is closed (organizer).
    CloseEvent {
        event: Uuid,
    },
    /// Wait for the joined event to close, then print its standings.
    Watch,
    /// Print the participant's scored breakdown once the event is closed.
    Results,
    /// Download the participant's PDF report.
    Pdf {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum EventCommand {
    List {
        /// Only events that still accept evaluations.
        #[arg(long)]
        open: bool,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: Option<String>,
    },
    /// Set the open flag of an event.
    SetOpen {
        event: Uuid,
        #[arg(action = clap::ArgAction::Set)]
        open: bool,
    },
    Delete {
        event: Uuid,
    },
}

#[derive(Subcommand)]
pub enum RoundCommand {
    List {
        event: Uuid,
    },
    Create {
        event: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: Option<i32>,
    },
    Update {
        round: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        position: Option<i32>,
        #[arg(long)]
        open: Option<bool>,
    },
    Delete {
        round: Uuid,
    },
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// JSON file with the tasting sheet answers.
    #[arg(long)]
    answers: Option<PathBuf>,

    /// Event whose answer key is entered (organizer only).
    #[arg(long)]
    event: Option<Uuid>,

    /// Close the round whose answer key is stored, right after storing it or from an
    /// earlier run (organizer only).
    #[arg(long)]
    close_round: bool,

    /// Keep waiting for the next round to open instead of exiting on the waiting screen.
    #[arg(long)]
    wait: bool,
}

/// Wrap a flow failure so the user-facing message comes first.
fn user_error(err: FlowError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

pub async fn run(command: Command, app: &AppShell, http: &HttpScoringApi) -> anyhow::Result<()> {
    let api = app.api();
    match command {
        Command::Login { name, password } => {
            let view = app.login(&name, &password).await.map_err(user_error)?;
            println!("Bem-vindo, {name}. {}", describe(&view));
        }
        Command::Join { name, code } => {
            let view = app.join(&name, &code).await.map_err(user_error)?;
            println!("Bem-vindo, {name}. {}", describe(&view));
        }
        Command::Logout => {
            app.logout().await.map_err(user_error)?;
            println!("Sessão encerrada.");
        }
        Command::Whoami => match app.session().identity().await {
            Some(identity) => println!(
                "{} ({:?}) {} - {}",
                identity.name,
                identity.user_type,
                identity.participant_id,
                describe(&app.view().await)
            ),
            None => println!("Nenhum usuário conectado."),
        },
        Command::Events(command) => {
            app.open(SommelierView::Events).await.map_err(user_error)?;
            run_events(command, app).await?;
        }
        Command::Rounds(command) => {
            app.open(SommelierView::Rounds).await.map_err(user_error)?;
            run_rounds(command, app).await?;
        }
        Command::Ranking { event } | Command::Winner { event } => {
            app.open(SommelierView::EventResult { event_id: event })
                .await
                .map_err(user_error)?;
            print_standings(&app.standings().await.map_err(user_error)?);
        }
        Command::AnswerKey { event } => {
            let items = results_service::answer_key(api, event)
                .await
                .map_err(user_error)?;
            if items.is_empty() {
                println!("Nenhum gabarito cadastrado.");
            }
            items.iter().for_each(print_answer_key_item);
        }
        Command::Evaluate(args) => evaluate(args, app).await?,
        Command::CloseEvent { event } => {
            app.open(SommelierView::AnswerKey {
                event_id: Some(event),
            })
            .await
            .map_err(user_error)?;
            let flow = app.evaluation_flow().await.map_err(user_error)?;
            flow.load_pending_round().await.map_err(user_error)?;
            let snapshot = flow.close_event().await.map_err(user_error)?;
            print_snapshot(&snapshot);
        }
        Command::Watch => {
            println!("Aguardando o encerramento do evento...");
            app.await_event_close(None).await.map_err(user_error)?;
            print_standings(&app.standings().await.map_err(user_error)?);
        }
        Command::Results => {
            app.await_event_close(None).await.map_err(user_error)?;
            let view = app.load_results().await.map_err(user_error)?;
            if let View::Participant(ParticipantView::Results { results, .. }) = view {
                print_results(&results);
            }
        }
        Command::Pdf { out } => {
            let written = results_service::download_results_pdf(http, out.as_deref())
                .await
                .map_err(user_error)?;
            println!("PDF salvo em {}", written.display());
        }
    }
    Ok(())
}

async fn run_events(command: EventCommand, app: &AppShell) -> anyhow::Result<()> {
    let api = app.api();
    match command {
        EventCommand::List { open } => {
            let events = if open {
                catalog_service::list_open_events(api).await
            } else {
                catalog_service::list_events(api).await
            }
            .map_err(user_error)?;
            for event in events {
                println!(
                    "{}  {:<30} código: {:<12} {}",
                    event.id,
                    event.name,
                    event.access_code.as_deref().unwrap_or("-"),
                    if event.is_open { "aberto" } else { "fechado" }
                );
            }
        }
        EventCommand::Create { name, code } => {
            let event = catalog_service::create_event(api, &name, code)
                .await
                .map_err(user_error)?;
            println!("Evento criado: {} ({})", event.name, event.id);
        }
        EventCommand::SetOpen { event, open } => {
            let is_open = catalog_service::set_event_open(api, event, open)
                .await
                .map_err(user_error)?;
            println!("Evento {event} {}", if is_open { "aberto" } else { "fechado" });
        }
        EventCommand::Delete { event } => {
            catalog_service::delete_event(api, event)
                .await
                .map_err(user_error)?;
            println!("Evento excluído.");
        }
    }
    Ok(())
}

async fn run_rounds(command: RoundCommand, app: &AppShell) -> anyhow::Result<()> {
    let api = app.api();
    match command {
        RoundCommand::List { event } => {
            let rounds = catalog_service::list_rounds(api, event)
                .await
                .map_err(user_error)?;
            if rounds.is_empty() {
                println!("Nenhum round cadastrado para este evento.");
            }
            for round in rounds {
                println!(
                    "{:>3}  {}  {:<30} {}",
                    round.position,
                    round.id,
                    round.name,
                    if round.is_open { "aberto" } else { "fechado" }
                );
            }
        }
        RoundCommand::Create {
            event,
            name,
            position,
        } => {
            let round = catalog_service::create_round(api, event, &name, position)
                .await
                .map_err(user_error)?;
            println!("Round criado: {} na posição {}", round.name, round.position);
        }
        RoundCommand::Update {
            round,
            name,
            position,
            open,
        } => {
            let update = UpdateRoundRequest {
                name,
                position,
                is_open: open,
            };
            let round = catalog_service::update_round(api, round, update)
                .await
                .map_err(user_error)?;
            println!("Round atualizado: {} ({})", round.name, round.id);
        }
        RoundCommand::Delete { round } => {
            catalog_service::delete_round(api, round)
                .await
                .map_err(user_error)?;
            println!("Round excluído.");
        }
    }
    Ok(())
}

async fn evaluate(args: EvaluateArgs, app: &AppShell) -> anyhow::Result<()> {
    if let Some(event_id) = args.event {
        app.open(SommelierView::AnswerKey {
            event_id: Some(event_id),
        })
        .await
        .map_err(user_error)?;
    }
    let flow = app.evaluation_flow().await.map_err(user_error)?;
    let mut snapshot = flow.load_pending_round().await.map_err(user_error)?;
    if args.wait && matches!(snapshot.phase, FormPhase::Waiting { .. }) {
        print_snapshot(&snapshot);
        snapshot = app.await_next_round(&flow).await.map_err(user_error)?;
    }

    if matches!(snapshot.phase, FormPhase::Active(_)) {
        let Some(path) = args.answers else {
            print_snapshot(&snapshot);
            bail!("informe as respostas com --answers <arquivo.json>");
        };
        let answers = read_answers(&path).await?;
        flow.edit(|form| *form = answers).await.map_err(user_error)?;
        snapshot = submit(&flow).await?;
    }

    if args.close_round && matches!(snapshot.phase, FormPhase::LockedForClose(_)) {
        snapshot = flow.close_round().await.map_err(user_error)?;
    }
    print_snapshot(&snapshot);
    Ok(())
}

async fn submit(flow: &EvaluationFlow) -> anyhow::Result<Snapshot> {
    match flow.submit().await {
        Ok(snapshot) => Ok(snapshot),
        Err(err) => {
            let shown = flow.snapshot().await.phase.error().map(str::to_string);
            let message = shown.unwrap_or_else(|| err.user_message());
            Err(anyhow::Error::new(err).context(message))
        }
    }
}

async fn read_answers(path: &Path) -> anyhow::Result<EvaluationForm> {
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading answers from {}", path.display()))?;
    serde_json::from_slice(&contents)
        .with_context(|| format!("parsing answers from {}", path.display()))
}

fn describe(view: &View) -> String {
    match view {
        View::Login => "Faça login para continuar.".into(),
        View::Sommelier(SommelierView::Menu) => "Menu do sommelier.".into(),
        View::Sommelier(other) => format!("Tela do sommelier: {other:?}."),
        View::Participant(ParticipantView::Evaluating { event_id }) => {
            format!("Avaliando o evento {event_id}.")
        }
        View::Participant(ParticipantView::EventFinished { event_id, .. }) => {
            format!("Evento {event_id} encerrado.")
        }
        View::Participant(ParticipantView::Results { event_id, .. }) => {
            format!("Resultado do evento {event_id}.")
        }
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    match &snapshot.phase {
        FormPhase::Active(active) | FormPhase::LockedForClose(active) => {
            println!(
                "Round {} - {}",
                active.round.position, active.round.round_name
            );
            if matches!(snapshot.phase, FormPhase::LockedForClose(_)) {
                println!("Gabarito registrado. Feche a rodada para continuar.");
            }
        }
        FormPhase::Waiting { .. } => {
            if let Some(message) = snapshot.waiting_message() {
                println!("{message}");
            }
        }
        FormPhase::Finished => println!("Evento encerrado."),
        other => println!("{}", other.name()),
    }
    if let Some(error) = snapshot.phase.error() {
        eprintln!("{error}");
    }
}

fn print_standings(standings: &EventStandings) {
    match standings.winners.winners.as_slice() {
        [] => println!("Nenhum vencedor encontrado."),
        [winner] => println!(
            "Vencedor: {} ({} pontos, {:.1}%)",
            winner.participant_name, winner.total_score, winner.percentual
        ),
        winners => {
            println!("Empate entre {} participantes:", winners.len());
            for winner in winners {
                println!("  {} ({} pontos)", winner.participant_name, winner.total_score);
            }
        }
    }
    if standings.ranking.is_empty() {
        println!("Nenhum resultado disponível.");
    }
    for entry in &standings.ranking {
        println!(
            "{:>3}º  {:<30} {:>4} pontos  {:>5.1}%",
            entry.position, entry.participant_name, entry.total_score, entry.percentual
        );
    }
}

fn print_answer_key_item(item: &AnswerKeyItem) {
    println!("{} ({})", item.round_name, item.round_id);
    println!(
        "  Visual: {:?}, intensidade {}, {} {}",
        item.limpidity,
        scale_label("visualIntensity", Some(item.visual_intensity)),
        item.color_type.label(),
        item.color_tone.label()
    );
    println!(
        "  Olfativo: {:?}, intensidade {}, aromas: {}",
        item.condition,
        scale_label("aromaIntensity", Some(item.aroma_intensity)),
        item.aromas.as_deref().unwrap_or("-")
    );
    println!(
        "  Gustativo: {:?}, tanino {}, álcool {}, corpo {}, acidez {}, persistência {}",
        item.sweetness,
        scale_label("tannin", item.tannin),
        scale_label("alcohol", Some(item.alcohol)),
        scale_label("consistence", Some(item.consistence)),
        scale_label("acidity", Some(item.acidity)),
        scale_label("persistence", Some(item.persistence))
    );
    println!(
        "  Conclusão: {:?}, {} / {} / {}",
        item.quality,
        item.grape.map_or("-", Grape::label),
        item.country.map_or("-", Country::label),
        item.vintage
            .filter(|vintage| *vintage > 0)
            .map_or_else(|| "-".to_string(), |vintage| vintage.to_string())
    );
}

fn print_results(results: &ParticipantResults) {
    for round in &results.rounds {
        let (correct, partial, wrong) = round.tally();
        println!(
            "Round {}: {correct} certos, {partial} parciais, {wrong} errados",
            round.round_id
        );
        for block in &round.blocks {
            println!("  {}", block.label);
            for item in &block.items {
                println!(
                    "    {:<20} você: {:<20} gabarito: {:<20} {:?}",
                    item.label, item.participant, item.answer_key, item.status
                );
            }
        }
    }
    let stars = results.score.tier().level().map_or_else(String::new, |level| {
        let level = usize::from(level);
        format!(" {}{}", "★".repeat(level), "☆".repeat(5 - level))
    });
    println!(
        "Total: {} pontos ({:.1}%) - {}{stars}",
        results.score.total_score, results.score.percentual, results.score.badge
    );
}
