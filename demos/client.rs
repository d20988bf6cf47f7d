use argh::FromArgs;
use infernum_lens::{
    ActionId, ClientConfig, DEFAULT_BASE_URL, HttpTransport, Mode, SelectOutcome, SelectedFile,
    SelectionEvent, Session, SubmitOutcome,
};
use std::path::PathBuf;

#[derive(FromArgs)]
/// Classify an image with the remote inference service
struct ClientArgs {
    /// base URL of the inference service
    #[argh(option, short = 'u', default = "DEFAULT_BASE_URL.to_string()")]
    url: String,

    /// the path to the image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// request explainability maps as well
    #[argh(switch, short = 'x')]
    explain: bool,

    /// directory to write the explainability maps to
    #[argh(option, short = 'o')]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: ClientArgs = argh::from_env();

    let transport = HttpTransport::new(ClientConfig::new(args.url));
    let mut session = Session::new();

    let file = SelectedFile::from_path(&args.image_path)?;
    if let SelectOutcome::Rejected(e) = session.select(SelectionEvent::picker(ActionId(1), file)) {
        print!("{}", session.view());
        return Err(e.into());
    }

    let mode = if args.explain { Mode::Explain } else { Mode::Predict };
    let outcome = session.submit(mode, &transport).await;
    print!("{}", session.view());

    match outcome {
        SubmitOutcome::Rendered => {}
        SubmitOutcome::Failed(e) => return Err(e.into()),
        other => return Err(format!("submission did not complete: {other:?}").into()),
    }

    let cards = session
        .view()
        .result
        .as_ref()
        .and_then(|result| result.xai_cards.as_ref());
    if let (Some(out_dir), Some(cards)) = (&args.out_dir, cards) {
        std::fs::create_dir_all(out_dir)?;
        for card in cards {
            let path = out_dir.join(format!("{}.png", card.method));
            std::fs::write(&path, &card.png)?;
            log::info!("Wrote {}", path.display());
        }
    }

    Ok(())
}
