fn main() {
    if let Err(error) = streamers_tracking_lib::run() {
        eprintln!("streamers-tracking: {:#}", error);
        std::process::exit(1);
    }
}
