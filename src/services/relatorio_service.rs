// src/services/relatorio_service.rs

use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AlunoRepository, PagamentoRepository, PresencaRepository, RelatorioRepository},
    middleware::filial::FilialScope,
    models::{
        aluno::{AlunoFiltro, StatusPagamento},
        pagamento::PagamentoFiltro,
        presenca::PresencaFiltro,
        relatorio::{
            AlunosPorFilial, AlunosPorStatus, FaixaEtaria, LinhaAluno, LinhaReceita, ReceitaMensal,
            ReceitaPorForma, RelatorioAlunos, RelatorioFinanceiro, RelatorioPresencas, RelatorioQuery,
        },
    },
};

pub const FAIXAS_ETARIAS: [&str; 7] = ["até 6", "7-9", "10-12", "13-15", "16-17", "18+", "sem data"];

const STATUS_ORDEM: [StatusPagamento; 3] =
    [StatusPagamento::EmDia, StatusPagamento::Pendente, StatusPagamento::Atrasado];

pub fn faixa_etaria(idade: Option<u32>) -> &'static str {
    match idade {
        None => "sem data",
        Some(0..=6) => "até 6",
        Some(7..=9) => "7-9",
        Some(10..=12) => "10-12",
        Some(13..=15) => "13-15",
        Some(16..=17) => "16-17",
        Some(_) => "18+",
    }
}

/// Soma por mês de referência e por forma de pagamento.
pub fn agregar_receita(ano: i32, linhas: &[LinhaReceita]) -> RelatorioFinanceiro {
    let mut meses: BTreeMap<&str, (Decimal, i64)> = BTreeMap::new();
    let mut por_forma: Vec<ReceitaPorForma> = Vec::new();
    let mut total = Decimal::ZERO;

    for linha in linhas {
        total += linha.valor;

        let mes = meses.entry(linha.mes_referencia.as_str()).or_insert((Decimal::ZERO, 0));
        mes.0 += linha.valor;
        mes.1 += 1;

        match por_forma.iter_mut().find(|f| f.forma_pagamento == linha.forma_pagamento) {
            Some(forma) => {
                forma.total += linha.valor;
                forma.quantidade += 1;
            }
            None => por_forma.push(ReceitaPorForma {
                forma_pagamento: linha.forma_pagamento,
                total: linha.valor,
                quantidade: 1,
            }),
        }
    }

    // Maior receita primeiro
    por_forma.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.forma_pagamento.label().cmp(b.forma_pagamento.label()))
    });

    RelatorioFinanceiro {
        ano,
        total,
        meses: meses
            .into_iter()
            .map(|(mes, (total, quantidade))| ReceitaMensal {
                mes_referencia: mes.to_string(),
                total,
                quantidade,
            })
            .collect(),
        por_forma,
    }
}

/// Distribuição dos alunos ativos por idade, filial e situação financeira.
pub fn agregar_alunos(hoje: NaiveDate, linhas: &[LinhaAluno]) -> RelatorioAlunos {
    let mut faixas = [0i64; FAIXAS_ETARIAS.len()];
    let mut status = [0i64; STATUS_ORDEM.len()];
    let mut por_filial: BTreeMap<(&str, i32), i64> = BTreeMap::new();

    for linha in linhas {
        let idade = linha.data_nascimento.and_then(|n| hoje.years_since(n));
        let faixa = faixa_etaria(idade);
        if let Some(i) = FAIXAS_ETARIAS.iter().position(|f| *f == faixa) {
            faixas[i] += 1;
        }
        if let Some(i) = STATUS_ORDEM.iter().position(|s| *s == linha.status_pagamento) {
            status[i] += 1;
        }
        *por_filial.entry((linha.filial_nome.as_str(), linha.filial_id)).or_insert(0) += 1;
    }

    RelatorioAlunos {
        total: linhas.len() as i64,
        faixas_etarias: FAIXAS_ETARIAS
            .iter()
            .zip(faixas)
            .map(|(faixa, quantidade)| FaixaEtaria { faixa: faixa.to_string(), quantidade })
            .collect(),
        por_filial: por_filial
            .into_iter()
            .map(|((filial_nome, filial_id), quantidade)| AlunosPorFilial {
                filial_id,
                filial_nome: filial_nome.to_string(),
                quantidade,
            })
            .collect(),
        por_status: STATUS_ORDEM
            .iter()
            .zip(status)
            .map(|(status, quantidade)| AlunosPorStatus { status: *status, quantidade })
            .collect(),
    }
}

fn sim_nao(valor: bool) -> &'static str {
    if valor { "Sim" } else { "Não" }
}

fn opt<T: ToString>(valor: &Option<T>) -> String {
    valor.as_ref().map(ToString::to_string).unwrap_or_default()
}

// Monta o CSV em memória. O csv::Writer cuida das aspas e separadores.
fn gerar_csv<I>(cabecalho: &[&str], linhas: I) -> Result<Vec<u8>, AppError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(cabecalho).map_err(anyhow::Error::from)?;
    for linha in linhas {
        wtr.write_record(&linha).map_err(anyhow::Error::from)?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("falha ao gerar CSV: {}", e)))
}

#[derive(Clone)]
pub struct RelatorioService {
    relatorio_repo: RelatorioRepository,
    aluno_repo: AlunoRepository,
    pagamento_repo: PagamentoRepository,
    presenca_repo: PresencaRepository,
    pool: PgPool,
}

impl RelatorioService {
    pub fn new(
        relatorio_repo: RelatorioRepository,
        aluno_repo: AlunoRepository,
        pagamento_repo: PagamentoRepository,
        presenca_repo: PresencaRepository,
        pool: PgPool,
    ) -> Self {
        Self { relatorio_repo, aluno_repo, pagamento_repo, presenca_repo, pool }
    }

    pub async fn financeiro(&self, scope: &FilialScope, query: &RelatorioQuery) -> Result<RelatorioFinanceiro, AppError> {
        let filial_id = scope.filtro(query.filial_id)?;
        let ano = query.ano.unwrap_or_else(|| Local::now().year());

        let linhas = self.relatorio_repo.linhas_receita(&self.pool, filial_id, ano).await?;
        Ok(agregar_receita(ano, &linhas))
    }

    pub async fn alunos(&self, scope: &FilialScope, query: &RelatorioQuery) -> Result<RelatorioAlunos, AppError> {
        let filial_id = scope.filtro(query.filial_id)?;
        let linhas = self.relatorio_repo.linhas_alunos(&self.pool, filial_id).await?;
        Ok(agregar_alunos(Local::now().date_naive(), &linhas))
    }

    pub async fn presencas(&self, scope: &FilialScope, query: &RelatorioQuery) -> Result<RelatorioPresencas, AppError> {
        let filial_id = scope.filtro(query.filial_id)?;
        let turmas = self
            .relatorio_repo
            .presencas_por_turma(&self.pool, filial_id, query.data_inicio, query.data_fim)
            .await?;

        Ok(RelatorioPresencas {
            data_inicio: query.data_inicio,
            data_fim: query.data_fim,
            turmas,
        })
    }

    // ---
    // Exportação CSV
    // ---

    pub async fn alunos_csv(&self, scope: &FilialScope, filtro: &AlunoFiltro) -> Result<Vec<u8>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        let alunos = self.aluno_repo.list(&self.pool, filtro, filial_id).await?;

        gerar_csv(
            &[
                "ID", "Nome", "Data de nascimento", "CPF", "E-mail", "Telefone", "Responsável",
                "Telefone do responsável", "Filial", "Ativo", "Status do pagamento",
            ],
            alunos.into_iter().map(|a| {
                vec![
                    a.id.to_string(),
                    a.nome,
                    opt(&a.data_nascimento),
                    opt(&a.cpf),
                    opt(&a.email),
                    opt(&a.telefone),
                    opt(&a.nome_responsavel),
                    opt(&a.telefone_responsavel),
                    a.filial_id.to_string(),
                    sim_nao(a.ativo).to_string(),
                    a.status_pagamento.label().to_string(),
                ]
            }),
        )
    }

    pub async fn pagamentos_csv(&self, scope: &FilialScope, filtro: &PagamentoFiltro) -> Result<Vec<u8>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        let pagamentos = self.pagamento_repo.list(&self.pool, filtro, filial_id).await?;

        gerar_csv(
            &["ID", "Aluno", "Valor", "Mês de referência", "Data do pagamento", "Forma de pagamento", "Observações"],
            pagamentos.into_iter().map(|p| {
                vec![
                    p.pagamento.id.to_string(),
                    p.aluno_nome,
                    p.pagamento.valor.to_string(),
                    p.pagamento.mes_referencia,
                    p.pagamento.data_pagamento.to_string(),
                    p.pagamento.forma_pagamento.label().to_string(),
                    opt(&p.pagamento.observacoes),
                ]
            }),
        )
    }

    pub async fn presencas_csv(&self, scope: &FilialScope, filtro: &PresencaFiltro) -> Result<Vec<u8>, AppError> {
        let filial_id = scope.filtro(filtro.filial_id)?;
        let presencas = self.presenca_repo.list(&self.pool, filtro, filial_id).await?;

        gerar_csv(
            &["Data", "Turma", "Aluno", "Presente", "Observações"],
            presencas.into_iter().map(|p| {
                vec![
                    p.presenca.data.to_string(),
                    p.turma_nome,
                    p.aluno_nome,
                    sim_nao(p.presenca.presente).to_string(),
                    opt(&p.presenca.observacoes),
                ]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pagamento::FormaPagamento;

    fn data(ano: i32, mes: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, dia).unwrap()
    }

    fn reais(valor: &str) -> Decimal {
        valor.parse().unwrap()
    }

    fn receita(mes: &str, valor: Decimal, forma: FormaPagamento) -> LinhaReceita {
        LinhaReceita { mes_referencia: mes.into(), valor, forma_pagamento: forma }
    }

    #[test]
    fn faixas_nos_limites() {
        assert_eq!(faixa_etaria(None), "sem data");
        assert_eq!(faixa_etaria(Some(6)), "até 6");
        assert_eq!(faixa_etaria(Some(7)), "7-9");
        assert_eq!(faixa_etaria(Some(12)), "10-12");
        assert_eq!(faixa_etaria(Some(13)), "13-15");
        assert_eq!(faixa_etaria(Some(17)), "16-17");
        assert_eq!(faixa_etaria(Some(18)), "18+");
        assert_eq!(faixa_etaria(Some(40)), "18+");
    }

    #[test]
    fn receita_por_mes_e_por_forma() {
        let linhas = vec![
            receita("2025-02", reais("150.00"), FormaPagamento::Pix),
            receita("2025-01", reais("150.00"), FormaPagamento::Dinheiro),
            receita("2025-02", reais("120.50"), FormaPagamento::Pix),
        ];

        let relatorio = agregar_receita(2025, &linhas);

        assert_eq!(relatorio.total, reais("420.50"));
        assert_eq!(
            relatorio.meses,
            vec![
                ReceitaMensal { mes_referencia: "2025-01".into(), total: reais("150.00"), quantidade: 1 },
                ReceitaMensal { mes_referencia: "2025-02".into(), total: reais("270.50"), quantidade: 2 },
            ]
        );
        assert_eq!(relatorio.por_forma[0].forma_pagamento, FormaPagamento::Pix);
        assert_eq!(relatorio.por_forma[0].quantidade, 2);
        assert_eq!(relatorio.por_forma[1].total, reais("150.00"));
    }

    #[test]
    fn receita_vazia() {
        let relatorio = agregar_receita(2024, &[]);
        assert_eq!(relatorio.total, Decimal::ZERO);
        assert!(relatorio.meses.is_empty());
        assert!(relatorio.por_forma.is_empty());
    }

    #[test]
    fn alunos_por_idade_filial_e_status() {
        let hoje = data(2025, 6, 15);
        let linha = |nascimento: Option<NaiveDate>, status, filial_id, filial_nome: &str| LinhaAluno {
            data_nascimento: nascimento,
            status_pagamento: status,
            filial_id,
            filial_nome: filial_nome.into(),
        };
        let linhas = vec![
            // Faz 10 anos no dia 16: ainda tem 9
            linha(Some(data(2015, 6, 16)), StatusPagamento::EmDia, 2, "Zona Sul"),
            linha(Some(data(2015, 6, 15)), StatusPagamento::Atrasado, 1, "Centro"),
            linha(None, StatusPagamento::EmDia, 1, "Centro"),
        ];

        let relatorio = agregar_alunos(hoje, &linhas);

        assert_eq!(relatorio.total, 3);
        let quantidade = |faixa: &str| {
            relatorio.faixas_etarias.iter().find(|f| f.faixa == faixa).map(|f| f.quantidade)
        };
        assert_eq!(quantidade("7-9"), Some(1));
        assert_eq!(quantidade("10-12"), Some(1));
        assert_eq!(quantidade("sem data"), Some(1));
        assert_eq!(quantidade("18+"), Some(0));
        assert_eq!(relatorio.faixas_etarias.len(), FAIXAS_ETARIAS.len());

        assert_eq!(
            relatorio.por_filial,
            vec![
                AlunosPorFilial { filial_id: 1, filial_nome: "Centro".into(), quantidade: 2 },
                AlunosPorFilial { filial_id: 2, filial_nome: "Zona Sul".into(), quantidade: 1 },
            ]
        );
        assert_eq!(
            relatorio.por_status,
            vec![
                AlunosPorStatus { status: StatusPagamento::EmDia, quantidade: 2 },
                AlunosPorStatus { status: StatusPagamento::Pendente, quantidade: 0 },
                AlunosPorStatus { status: StatusPagamento::Atrasado, quantidade: 1 },
            ]
        );
    }

    #[test]
    fn csv_escapa_virgulas_e_aspas() {
        let bytes = gerar_csv(
            &["Nome", "Observações"],
            vec![vec!["Silva, João".to_string(), "disse \"oi\"".to_string()]],
        )
        .unwrap();
        let texto = String::from_utf8(bytes).unwrap();
        assert_eq!(texto, "Nome,Observações\n\"Silva, João\",\"disse \"\"oi\"\"\"\n");
    }
}
