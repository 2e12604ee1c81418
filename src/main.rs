fn main() {
    if let Err(err) = techtree_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
