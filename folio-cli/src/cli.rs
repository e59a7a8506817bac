use std::{
    io::{self, BufRead},
    path::PathBuf,
    sync::Arc,
    thread,
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use folio_core::{
    catalog::{Catalog, CatalogHandle, Photo},
    config::Config,
    error::Error,
    gallery::{self, Filter, Gallery},
    share_link::{self, ImageHost},
    slideshow::Slideshow,
    viewer::Input,
};
use itertools::Itertools;

#[derive(Parser)]
#[command(name = "folio", version, about = "Browse a photo portfolio catalog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Catalog manifest, defaults to $FOLIO_MANIFEST or the configured path
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[derive(Args)]
pub struct SelectionArgs {
    #[command(flatten)]
    manifest: ManifestArgs,

    /// Only show photos of this album
    #[arg(short, long)]
    album: Option<String>,

    /// Show at most this many photos
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a file share link into display URLs
    Resolve {
        link: String,

        /// Thumbnail width in pixels
        #[arg(long)]
        size: Option<u32>,

        /// URL template family: drive or user-content
        #[arg(long)]
        host: Option<ImageHost>,

        /// Fail on unrecognized links instead of echoing them
        #[arg(long)]
        strict: bool,
    },

    /// Extract the folder ID from a folder share link
    Folder { link: String },

    /// List albums with their photo counts and covers
    Albums {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Show at most this many albums
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List the photos of the catalog
    Photos(SelectionArgs),

    /// Report photos with unknown albums or unresolved URLs
    Check(ManifestArgs),

    /// Browse photos interactively, reading commands from stdin
    View(SelectionArgs),

    /// Cycle through photos like the home page slider
    Slideshow {
        #[command(flatten)]
        selection: SelectionArgs,

        /// How many times to go through the photos
        #[arg(long, default_value_t = 1)]
        cycles: usize,

        /// Seconds per slide
        #[arg(long)]
        interval: Option<u64>,
    },
}

impl Cli {
    pub fn run(self, config: Config) -> Result<(), Error> {
        match self.command {
            Commands::Resolve {
                link,
                size,
                host,
                strict,
            } => resolve(
                &link,
                host.unwrap_or(config.image_host),
                size.unwrap_or(config.thumbnail_size),
                strict,
            ),
            Commands::Folder { link } => {
                match share_link::extract_folder_id(&link) {
                    Some(folder_id) => println!("{folder_id}"),
                    None => log::warn!("could not extract folder ID from link: {}", link),
                }
                Ok(())
            }
            Commands::Albums { manifest, limit } => albums(&manifest, limit, &config),
            Commands::Photos(selection) => photos(&selection, &config),
            Commands::Check(manifest) => check(&manifest, &config),
            Commands::View(selection) => view(&selection, &config),
            Commands::Slideshow {
                selection,
                cycles,
                interval,
            } => slideshow(&selection, cycles, interval, &config),
        }
    }
}

fn load_catalog(args: &ManifestArgs, config: &Config) -> Result<CatalogHandle, Error> {
    let path = args
        .manifest
        .clone()
        .or_else(|| config.manifest_path())
        .ok_or_else(|| {
            Error::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                "no manifest given, use --manifest or set FOLIO_MANIFEST",
            ))
        })?;
    Ok(Arc::new(Catalog::load(&path)?))
}

fn selected_filter(selection: &SelectionArgs, catalog: &Catalog) -> Result<Filter, Error> {
    match &selection.album {
        Some(album_id) => Filter::parse_in(album_id, catalog),
        None => Ok(Filter::All),
    }
}

fn resolve(link: &str, host: ImageHost, size: u32, strict: bool) -> Result<(), Error> {
    let (direct, thumbnail) = if strict {
        (host.try_direct_url(link)?, host.try_thumbnail_url(link, size)?)
    } else {
        (host.resolve_direct(link), host.resolve_thumbnail(link, size))
    };
    match share_link::extract_file_id(link) {
        Some(file_id) => println!("id:        {file_id}"),
        None => println!("id:        -"),
    }
    println!("direct:    {direct}");
    println!("thumbnail: {thumbnail}");
    Ok(())
}

fn albums(manifest: &ManifestArgs, limit: Option<usize>, config: &Config) -> Result<(), Error> {
    let catalog = load_catalog(manifest, config)?;
    for album in gallery::visible_albums(&catalog, limit.or(config.album_limit)) {
        let count = catalog.album_photos(&album.id).count();
        let cover = catalog
            .cover_photo(album)
            .map(|cover| share_link::resize_thumbnail(&cover, config.thumbnail_size))
            .unwrap_or_else(|| "No cover".to_string());
        println!("{:<20} {:<28} {:>4} photos  {}", album.id, album.title, count, cover);
    }
    if let Some(updated) = catalog.last_updated() {
        println!("last updated {updated}");
    }
    Ok(())
}

fn photos(selection: &SelectionArgs, config: &Config) -> Result<(), Error> {
    let catalog = load_catalog(&selection.manifest, config)?;
    let filter = selected_filter(selection, &catalog)?;
    let limit = selection.limit.or(config.grid_limit);
    for (position, photo) in gallery::visible_subset(&catalog, &filter, limit)
        .iter()
        .enumerate()
    {
        println!(
            "{:>3}. {:<24} {:<20} {}",
            position,
            photo.id,
            catalog.album_title(&photo.album_id),
            photo.thumbnail_url
        );
    }
    Ok(())
}

fn check(manifest: &ManifestArgs, config: &Config) -> Result<(), Error> {
    let catalog = load_catalog(manifest, config)?;
    let dangling = catalog.dangling_references();
    for photo in &dangling {
        println!("photo {} references unknown album {}", photo.id, photo.album_id);
    }
    let unresolved = catalog.unresolved_photos();
    for photo in &unresolved {
        println!("photo {} has no web URL: {}", photo.id, photo.direct_url);
    }
    println!(
        "{} albums, {} photos, {} problems",
        catalog.albums().len(),
        catalog.photos().len(),
        dangling.len() + unresolved.len()
    );
    Ok(())
}

const VIEW_HELP: &str = "commands: o <position|id>  <  >  x (close)  f <album|all>  ls  q";

fn view(selection: &SelectionArgs, config: &Config) -> Result<(), Error> {
    let catalog = load_catalog(&selection.manifest, config)?;
    let mut gallery = Gallery::new(catalog.clone(), selection.limit.or(config.grid_limit));
    gallery.set_filter(selected_filter(selection, &catalog)?);

    println!("{VIEW_HELP}");
    print_grid(&gallery);

    for line in io::stdin().lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("q"), _) => break,
            (Some("<"), _) => {
                gallery.handle_input(Input::ArrowLeft);
            }
            (Some(">"), _) => {
                gallery.handle_input(Input::ArrowRight);
            }
            (Some("x" | "esc"), _) => {
                gallery.handle_input(Input::Escape);
            }
            (Some("o"), Some(target)) => {
                let opened = match target.parse::<usize>() {
                    Ok(position) => gallery.open_at(position).map(|_| ()),
                    Err(_) => gallery.open_photo(target).map(|_| ()),
                };
                if let Err(err) = opened {
                    log::warn!("{}", err);
                }
            }
            (Some("f"), Some(value)) => match Filter::parse_in(value, &catalog) {
                Ok(filter) => {
                    gallery.set_filter(filter);
                    print_grid(&gallery);
                }
                Err(err) => log::warn!("{}", err),
            },
            (Some("ls"), _) => print_grid(&gallery),
            (None, _) => continue,
            _ => log::warn!("unknown command, {}", VIEW_HELP),
        }
        print_viewer(&gallery);
    }

    Ok(())
}

fn print_grid(gallery: &Gallery) {
    let catalog = gallery.catalog();
    let tabs = gallery::filters(catalog)
        .into_iter()
        .map(|filter| {
            let label = filter.label(catalog).to_string();
            if &filter == gallery.filter() {
                format!("[{label}]")
            } else {
                label
            }
        })
        .join("  ");
    println!("{tabs}");
    for (position, photo) in gallery.visible().iter().enumerate() {
        println!("{:>3}. {}", position, photo.id);
    }
}

fn print_viewer(gallery: &Gallery) {
    let Some(photo) = gallery.current() else {
        return;
    };
    let len = gallery.visible().len();
    let position = gallery.viewer().position().unwrap_or_default();
    let arrows = if gallery.has_prev() { "< >" } else { "" };
    println!(
        "[{}/{}] {} ({}) {} {}",
        position + 1,
        len,
        photo.id,
        gallery.catalog().album_title(&photo.album_id),
        photo.direct_url,
        arrows
    );
}

fn slideshow(
    selection: &SelectionArgs,
    cycles: usize,
    interval: Option<u64>,
    config: &Config,
) -> Result<(), Error> {
    let catalog = load_catalog(&selection.manifest, config)?;
    let filter = selected_filter(selection, &catalog)?;
    let slides = gallery::visible_subset(&catalog, &filter, selection.limit);
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.slide_interval());
    let mut show = Slideshow::with_interval(slides, interval);

    let Some(first) = show.current() else {
        log::warn!("nothing to show for {}", filter);
        return Ok(());
    };
    print_slide(&show, first);

    for _ in 1..slide_count(show.len(), cycles) {
        thread::sleep(show.interval());
        if let Some(photo) = show.advance().copied() {
            print_slide(&show, photo);
        }
    }
    Ok(())
}

fn slide_count(len: usize, cycles: usize) -> usize {
    len.saturating_mul(cycles)
}

fn print_slide(show: &Slideshow<&Photo>, photo: &Photo) {
    println!(
        "[{}/{}] {} {}",
        show.position() + 1,
        show.len(),
        photo.id,
        photo.direct_url
    );
}
