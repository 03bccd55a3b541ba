use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::common::error::AppError;

// ---
// Filtros das listagens: todas as telas usam "busca" + filtros de igualdade
// ---

/// Monta o padrão ILIKE de uma busca por substring. `%` e `_` digitados pelo
/// usuário valem como texto. Busca vazia não filtra nada.
pub(crate) fn like_pattern(termo: &str) -> Option<String> {
    let termo = termo.trim();
    if termo.is_empty() {
        return None;
    }
    let escaped = termo
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

/// Acrescenta `AND (col1 ILIKE $n OR col2 ILIKE $m ...)`.
pub(crate) fn push_busca(qb: &mut QueryBuilder<'_, Postgres>, colunas: &[&str], termo: Option<&str>) {
    let Some(pattern) = termo.and_then(like_pattern) else {
        return;
    };

    qb.push(" AND (");
    for (i, coluna) in colunas.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*coluna).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

/// Acrescenta `AND coluna <op> $n` quando o filtro veio preenchido.
pub(crate) fn push_cmp<'a, T>(qb: &mut QueryBuilder<'a, Postgres>, coluna: &str, op: &str, valor: Option<T>)
where
    T: 'a + Encode<'a, Postgres> + Type<Postgres>,
{
    if let Some(valor) = valor {
        qb.push(" AND ").push(coluna).push(" ").push(op).push(" ").push_bind(valor);
    }
}

pub(crate) fn push_eq<'a, T>(qb: &mut QueryBuilder<'a, Postgres>, coluna: &str, valor: Option<T>)
where
    T: 'a + Encode<'a, Postgres> + Type<Postgres>,
{
    push_cmp(qb, coluna, "=", valor);
}

// ---
// Tradução dos erros de escrita do Postgres
// ---

// numeric_value_out_of_range
const NUMERO_FORA_DA_FAIXA: &str = "22003";

/// INSERT/UPDATE: unicidade vira conflito, FK quebrada vira referência
/// inválida, CHECK violado ou número grande demais vira dado recusado.
pub(crate) fn map_write_error(e: sqlx::Error, conflict_key: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Conflict(conflict_key);
        }
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidReference;
        }
        if db_err.is_check_violation() || db_err.code().as_deref() == Some(NUMERO_FORA_DA_FAIXA) {
            return AppError::ConstraintViolation;
        }
    }
    e.into()
}

/// DELETE: FK quebrada significa que ainda há cadastros apontando para a linha.
pub(crate) fn map_delete_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::RecordInUse;
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), Some("%ana%".to_string()));
        assert_eq!(like_pattern("  50%_off "), Some("%50\\%\\_off%".to_string()));
        assert_eq!(like_pattern("   "), None);
    }

    #[test]
    fn busca_spans_all_columns() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM alunos WHERE 1=1");
        push_busca(&mut qb, &["nome", "email"], Some("silva"));
        push_eq(&mut qb, "filial_id", Some(3_i32));
        push_eq::<bool>(&mut qb, "ativo", None);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM alunos WHERE 1=1 AND (nome ILIKE $1 OR email ILIKE $2) AND filial_id = $3"
        );
    }

    #[test]
    fn empty_busca_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM turmas WHERE 1=1");
        push_busca(&mut qb, &["nome"], Some(""));
        push_busca(&mut qb, &["nome"], None);
        assert_eq!(qb.sql(), "SELECT * FROM turmas WHERE 1=1");
    }
}
