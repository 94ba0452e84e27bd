use clap::Parser;

#[derive(Debug, Parser, Clone)]
pub struct Cli {
    /// Fréquence de livraison de la surveillance (ms)
    #[arg(long, default_value_t = 10000)]
    pub frequence: u64,
}
