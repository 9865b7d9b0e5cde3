//! Entry point for PerunGL: parse the command line, start logging, run
//! the demo.

use std::path::PathBuf;

use anyhow::Result;

// Accept: --size=WxH, --width=N, --height=N. Later flags override
// earlier ones; anything unparseable keeps the default 1280x720.
fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .filter_map(|arg| arg.strip_prefix(flag))
        .next_back()
        .map(PathBuf::from)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (width, height) = parse_size_args(&args);
    let obj_path = parse_path_arg(&args, "--obj=");
    let texture_path = parse_path_arg(&args, "--texture=");

    log::info!("Starting PerunGL. window_size={}x{}", width, height);
    if let Some(path) = &obj_path {
        log::info!("Model: {}", path.display());
    }
    if let Some(path) = &texture_path {
        log::info!("Texture: {}", path.display());
    }

    let options = platform::RunOptions {
        width,
        height,
        obj_path,
        texture_path,
    };
    if let Err(err) = platform::run(options) {
        log::error!("{err:#}");
        return Err(err);
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn size_defaults_when_unspecified() {
        assert_eq!(parse_size_args(&args(&[])), (1280, 720));
    }

    #[test]
    fn size_flag_parses_both_dimensions() {
        assert_eq!(parse_size_args(&args(&["--size=800x600"])), (800, 600));
        assert_eq!(parse_size_args(&args(&["--size=800X600"])), (800, 600));
    }

    #[test]
    fn later_flags_override_earlier_ones() {
        let parsed = parse_size_args(&args(&["--size=800x600", "--width=1024"]));
        assert_eq!(parsed, (1024, 600));
    }

    #[test]
    fn zero_size_clamps_to_one() {
        assert_eq!(parse_size_args(&args(&["--size=0x0"])), (1, 1));
    }

    #[test]
    fn malformed_size_is_ignored() {
        assert_eq!(parse_size_args(&args(&["--size=abc"])), (1280, 720));
        assert_eq!(parse_size_args(&args(&["--width=ten", "--height="])), (1280, 720));
    }

    #[test]
    fn path_flags_take_the_last_occurrence() {
        let list = args(&["--obj=a.obj", "--obj=b.obj", "--texture=t.png"]);
        assert_eq!(parse_path_arg(&list, "--obj="), Some(PathBuf::from("b.obj")));
        assert_eq!(
            parse_path_arg(&list, "--texture="),
            Some(PathBuf::from("t.png"))
        );
        assert_eq!(parse_path_arg(&list, "--model="), None);
    }
}
