// src/db/aluno_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::aluno::{Aluno, AlunoFiltro, CreateAlunoPayload, StatusPagamento, UpdateAlunoPayload},
};

#[derive(Clone, Default)]
pub struct AlunoRepository;

impl AlunoRepository {
    pub fn new() -> Self {
        Self
    }

    /// `filial_id` é o filtro já resolvido pelo escopo da sessão.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &AlunoFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<Aluno>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT a.* FROM alunos a WHERE 1=1");
        push_busca(
            &mut qb,
            &["a.nome", "a.cpf", "a.email", "a.nome_responsavel"],
            filtro.busca.as_deref(),
        );
        push_eq(&mut qb, "a.filial_id", filial_id);
        push_eq(&mut qb, "a.ativo", filtro.ativo);
        push_eq(&mut qb, "a.status_pagamento", filtro.status_pagamento);
        if let Some(turma_id) = filtro.turma_id {
            qb.push(" AND EXISTS (SELECT 1 FROM matriculas m WHERE m.aluno_id = a.id AND m.ativo AND m.turma_id = ")
                .push_bind(turma_id)
                .push(")");
        }
        qb.push(" ORDER BY a.nome");

        let alunos = qb.build_query_as::<Aluno>().fetch_all(executor).await?;
        Ok(alunos)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Aluno>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aluno = sqlx::query_as::<_, Aluno>("SELECT * FROM alunos WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(aluno)
    }

    /// Trava o aluno até o fim da transação (troca de filial e matrícula).
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Aluno>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aluno = sqlx::query_as::<_, Aluno>("SELECT * FROM alunos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(aluno)
    }

    pub async fn contar_matriculas_ativas<'e, E>(&self, executor: E, id: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matriculas WHERE aluno_id = $1 AND ativo")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    /// Leva pagamentos e documentos do aluno para a filial nova.
    pub async fn mover_lancamentos<'e, E>(&self, executor: E, id: i32, filial_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            WITH pagamentos_movidos AS (
                UPDATE pagamentos SET filial_id = $2, updated_at = NOW()
                WHERE aluno_id = $1 AND filial_id <> $2
            )
            UPDATE documentos SET filial_id = $2
            WHERE aluno_id = $1 AND filial_id <> $2
            "#,
        )
        .bind(id)
        .bind(filial_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateAlunoPayload,
        filial_id: i32,
    ) -> Result<Aluno, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aluno = sqlx::query_as::<_, Aluno>(
            r#"
            INSERT INTO alunos (
                nome, data_nascimento, cpf, email, telefone, endereco,
                nome_responsavel, telefone_responsavel, email_responsavel, cpf_responsavel,
                filial_id, ativo, data_matricula, observacoes
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                COALESCE($12, TRUE), COALESCE($13, CURRENT_DATE), $14
            )
            RETURNING *
            "#,
        )
        .bind(input.nome.trim())
        .bind(input.data_nascimento)
        .bind(&input.cpf)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(&input.endereco)
        .bind(&input.nome_responsavel)
        .bind(&input.telefone_responsavel)
        .bind(&input.email_responsavel)
        .bind(&input.cpf_responsavel)
        .bind(filial_id)
        .bind(input.ativo)
        .bind(input.data_matricula)
        .bind(&input.observacoes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(aluno)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdateAlunoPayload,
    ) -> Result<Aluno, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let aluno = sqlx::query_as::<_, Aluno>(
            r#"
            UPDATE alunos SET
                nome = COALESCE($2, nome),
                data_nascimento = COALESCE($3, data_nascimento),
                cpf = COALESCE($4, cpf),
                email = COALESCE($5, email),
                telefone = COALESCE($6, telefone),
                endereco = COALESCE($7, endereco),
                nome_responsavel = COALESCE($8, nome_responsavel),
                telefone_responsavel = COALESCE($9, telefone_responsavel),
                email_responsavel = COALESCE($10, email_responsavel),
                cpf_responsavel = COALESCE($11, cpf_responsavel),
                filial_id = COALESCE($12, filial_id),
                ativo = COALESCE($13, ativo),
                data_matricula = COALESCE($14, data_matricula),
                observacoes = COALESCE($15, observacoes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.nome.as_deref().map(str::trim))
        .bind(input.data_nascimento)
        .bind(&input.cpf)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(&input.endereco)
        .bind(&input.nome_responsavel)
        .bind(&input.telefone_responsavel)
        .bind(&input.email_responsavel)
        .bind(&input.cpf_responsavel)
        .bind(input.filial_id)
        .bind(input.ativo)
        .bind(input.data_matricula)
        .bind(&input.observacoes)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?
        .ok_or(AppError::NotFound("aluno"))?;

        Ok(aluno)
    }

    // Matrículas, presenças e documentos saem junto. Pagamentos seguram.
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM alunos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_delete_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("aluno"));
        }
        Ok(())
    }

    // ---
    // Situação financeira
    // ---

    pub async fn set_status_pagamento<'e, E>(
        &self,
        executor: E,
        id: i32,
        status: StatusPagamento,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Sem mexer no updated_at: é derivado dos pagamentos
        sqlx::query("UPDATE alunos SET status_pagamento = $2 WHERE id = $1 AND status_pagamento <> $2")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Recalcula o status de todos os alunos do escopo numa única instrução.
    pub async fn recalcular_status<'e, E>(
        &self,
        executor: E,
        filial_id: Option<i32>,
        mes_referencia: &str,
        hoje: NaiveDate,
        dia_vencimento: i32,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE alunos a SET status_pagamento = novo.status
            FROM (
                SELECT al.id,
                    CASE
                        WHEN EXISTS (
                            SELECT 1 FROM pagamentos p
                            WHERE p.aluno_id = al.id AND p.mes_referencia = $2
                        ) THEN 'em_dia'::status_pagamento
                        WHEN EXTRACT(DAY FROM $3::date) > $4 THEN 'atrasado'::status_pagamento
                        ELSE 'pendente'::status_pagamento
                    END AS status
                FROM alunos al
                WHERE $1::int IS NULL OR al.filial_id = $1
            ) AS novo
            WHERE a.id = novo.id AND a.status_pagamento <> novo.status
            "#,
        )
        .bind(filial_id)
        .bind(mes_referencia)
        .bind(hoje)
        .bind(dia_vencimento)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
