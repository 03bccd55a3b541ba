// src/services/fixtures.rs
//
// Linhas mínimas para os testes de serviço que rodam contra o banco.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::middleware::filial::FilialScope;

pub const MATRIZ: FilialScope = FilialScope { filial_id: None, fixa: false };

pub fn unidade(filial_id: i32) -> FilialScope {
    FilialScope { filial_id: Some(filial_id), fixa: true }
}

pub async fn filial(pool: &PgPool, nome: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO filiais (nome) VALUES ($1) RETURNING id")
        .bind(nome)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn professor(pool: &PgPool, filial_id: i32, nome: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO professores (nome, filial_id) VALUES ($1, $2) RETURNING id")
        .bind(nome)
        .bind(filial_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn aluno(pool: &PgPool, filial_id: i32, nome: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO alunos (nome, filial_id, data_nascimento) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(nome)
    .bind(filial_id)
    .bind(NaiveDate::from_ymd_opt(2015, 3, 10))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn turma(pool: &PgPool, filial_id: i32, capacidade: i32, professor_id: Option<i32>) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO turmas (nome, capacidade, filial_id, professor_id) VALUES ('Sub-11', $1, $2, $3) RETURNING id",
    )
    .bind(capacidade)
    .bind(filial_id)
    .bind(professor_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn matricula(pool: &PgPool, aluno_id: i32, turma_id: i32) -> i32 {
    sqlx::query_scalar("INSERT INTO matriculas (aluno_id, turma_id) VALUES ($1, $2) RETURNING id")
        .bind(aluno_id)
        .bind(turma_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn pagamento(pool: &PgPool, aluno_id: i32, filial_id: i32, mes_referencia: &str) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO pagamentos (aluno_id, filial_id, valor, mes_referencia, data_pagamento, forma_pagamento)
        VALUES ($1, $2, 150.00, $3, CURRENT_DATE, 'pix')
        RETURNING id
        "#,
    )
    .bind(aluno_id)
    .bind(filial_id)
    .bind(mes_referencia)
    .fetch_one(pool)
    .await
    .unwrap()
}
