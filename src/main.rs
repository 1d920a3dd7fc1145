use std::{env, path::PathBuf};

use clap::{Parser, ValueEnum};
use log::{error, info};

use vendas::{send_report, summarize, summarize_detailed, LoadError, Table};

const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// Sistema de Relatórios de Vendas
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// E-mail do destinatário
    #[arg(long)]
    email: Option<String>,

    /// Tipo de relatório
    #[arg(long, value_enum, default_value_t = Tipo::Simples)]
    tipo: Tipo,

    /// Caminho do arquivo CSV de vendas
    #[arg(long, default_value = "data/vendas.csv")]
    csv: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Tipo {
    Simples,
    Detalhado,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Iniciando sistema de relatórios...");
    info!("Arquivo de dados: {}", args.csv.display());

    let table = match Table::load(&args.csv) {
        Ok(table) => table,
        Err(LoadError::NotFound(_)) => {
            println!("{RED}[ERRO] Arquivo de vendas não encontrado!{RESET}");
            return;
        }
        Err(err) => {
            // a malformed file degrades to the no-data report
            error!("{err}");
            Table::default()
        }
    };

    let report = match args.tipo {
        Tipo::Simples => summarize(&table),
        Tipo::Detalhado => summarize_detailed(&table),
    };

    println!("\n{}", "=".repeat(60));
    println!("{report}");
    println!("{}", "=".repeat(60));

    if let Some(to) = args.email {
        info!("Enviando relatório para: {to}");
        let subject = match args.tipo {
            Tipo::Simples => "Relatório de Vendas Diário",
            Tipo::Detalhado => "Relatório Detalhado de Vendas",
        };
        let sender = env::var("EMAIL_USER").ok();
        let password = env::var("EMAIL_PASSWORD").ok();
        if send_report(&to, subject, &report, sender, password) {
            println!("{GREEN}[SUCESSO] Relatório enviado com sucesso!{RESET}");
        } else {
            println!("{RED}[FALHA] Não foi possível enviar o e-mail.{RESET}");
        }
    } else {
        info!("Dica: use --email para enviar automaticamente por e-mail");
        info!("Exemplo: vendas --email seu@email.com --tipo detalhado");
    }
}
