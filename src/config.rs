// src/config.rs

use std::{env, time::Duration};

use anyhow::{bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        AlunoRepository, ComboRepository, ConfiguracoesRepository, DashboardRepository, DocumentoRepository,
        FilialRepository, GestorRepository, MatriculaRepository, PagamentoRepository, PresencaRepository,
        ProfessorRepository, RelatorioRepository, TurmaRepository, UserRepository,
    },
    services::{
        aluno_service::AlunoService, auth::AuthService, combo_service::ComboService,
        dashboard_service::DashboardService, documento_service::DocumentoService, filial_service::FilialService,
        gestor_service::GestorService, matricula_service::MatriculaService, pagamento_service::PagamentoService,
        presenca_service::PresencaService, professor_service::ProfessorService,
        relatorio_service::RelatorioService, turma_service::TurmaService,
    },
};

const SERVER_ADDR_PADRAO: &str = "0.0.0.0:3000";
const MAX_CONNECTIONS_PADRAO: u32 = 5;

/// Conta da matriz criada na primeira subida.
#[derive(Debug, Clone)]
pub struct AdminInicial {
    pub email: String,
    pub senha: String,
    pub nome: String,
}

/// Configuração lida do ambiente (`.env` incluso).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub cookie_secure: bool,
    pub admin_inicial: Option<AdminInicial>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|chave| env::var(chave).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let valor = |chave: &str| get(chave).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = valor("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = valor("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let max_connections = match valor("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {}", v))?,
            None => MAX_CONNECTIONS_PADRAO,
        };
        if max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS precisa ser maior que zero");
        }

        let cookie_secure = match valor("COOKIE_SECURE").as_deref() {
            None => false,
            Some("1") | Some("true") | Some("TRUE") | Some("True") => true,
            Some("0") | Some("false") | Some("FALSE") | Some("False") => false,
            Some(outro) => bail!("COOKIE_SECURE inválido: {}", outro),
        };

        let admin_inicial = match (valor("ADMIN_EMAIL"), valor("ADMIN_PASSWORD")) {
            (Some(email), Some(senha)) => Some(AdminInicial {
                email,
                senha,
                nome: valor("ADMIN_NOME").unwrap_or_else(|| "Administrador".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr: valor("SERVER_ADDR").unwrap_or_else(|| SERVER_ADDR_PADRAO.to_string()),
            max_connections,
            cookie_secure,
            admin_inicial,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub filial_service: FilialService,
    pub aluno_service: AlunoService,
    pub professor_service: ProfessorService,
    pub turma_service: TurmaService,
    pub matricula_service: MatriculaService,
    pub presenca_service: PresencaService,
    pub pagamento_service: PagamentoService,
    pub documento_service: DocumentoService,
    pub combo_service: ComboService,
    pub gestor_service: GestorService,
    pub dashboard_service: DashboardService,
    pub relatorio_service: RelatorioService,

    // Configurações não têm regra além do repositório
    pub configuracoes_repo: ConfiguracoesRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, config)
    }

    /// Monta o gráfico de dependências sobre uma pool já criada.
    pub fn from_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let user_repo = UserRepository::new(db_pool.clone());
        let filial_repo = FilialRepository::new();
        let aluno_repo = AlunoRepository::new();
        let professor_repo = ProfessorRepository::new();
        let turma_repo = TurmaRepository::new();
        let matricula_repo = MatriculaRepository::new();
        let presenca_repo = PresencaRepository::new();
        let pagamento_repo = PagamentoRepository::new();
        let documento_repo = DocumentoRepository::new();
        let combo_repo = ComboRepository::new();
        let configuracoes_repo = ConfiguracoesRepository::new();
        let gestor_repo = GestorRepository::new();
        let dashboard_repo = DashboardRepository::new();
        let relatorio_repo = RelatorioRepository::new();

        let i18n_store = I18nStore::load()?;
        let pool = || db_pool.clone();

        Ok(Self {
            auth_service: AuthService::new(user_repo.clone(), config.jwt_secret.clone(), pool()),
            filial_service: FilialService::new(filial_repo.clone(), user_repo.clone(), pool()),
            aluno_service: AlunoService::new(aluno_repo.clone(), configuracoes_repo.clone(), pool()),
            professor_service: ProfessorService::new(professor_repo.clone(), pool()),
            turma_service: TurmaService::new(turma_repo.clone(), professor_repo, pool()),
            matricula_service: MatriculaService::new(
                matricula_repo.clone(),
                turma_repo.clone(),
                aluno_repo.clone(),
                pool(),
            ),
            presenca_service: PresencaService::new(presenca_repo.clone(), matricula_repo, turma_repo, pool()),
            pagamento_service: PagamentoService::new(
                pagamento_repo.clone(),
                aluno_repo.clone(),
                configuracoes_repo.clone(),
                pool(),
            ),
            documento_service: DocumentoService::new(documento_repo, aluno_repo.clone(), pool()),
            combo_service: ComboService::new(combo_repo, pool()),
            gestor_service: GestorService::new(gestor_repo, user_repo, filial_repo, pool()),
            dashboard_service: DashboardService::new(dashboard_repo, pool()),
            relatorio_service: RelatorioService::new(relatorio_repo, aluno_repo, pagamento_repo, presenca_repo, pool()),
            configuracoes_repo,
            i18n_store,
            config,
            db_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> = pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |chave| mapa.get(chave).cloned()
    }

    #[test]
    fn aplica_padroes() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/escolinha"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5);
        assert!(!config.cookie_secure);
        assert!(config.admin_inicial.is_none());
    }

    #[test]
    fn exige_banco_e_segredo() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "segredo")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "  ")])).is_err());
    }

    #[test]
    fn le_valores_opcionais() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/escolinha"),
            ("JWT_SECRET", "segredo"),
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("COOKIE_SECURE", "true"),
            ("ADMIN_EMAIL", "matriz@escolinha.com.br"),
            ("ADMIN_PASSWORD", "troque-me"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 12);
        assert!(config.cookie_secure);
        let admin = config.admin_inicial.unwrap();
        assert_eq!(admin.email, "matriz@escolinha.com.br");
        assert_eq!(admin.nome, "Administrador");
    }

    #[test]
    fn recusa_numero_invalido() {
        let resultado = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "segredo"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(resultado.is_err());
    }
}
