// src/models/validacao.rs
//
// Validações customizadas compartilhadas pelos payloads. A `message` de cada
// erro é a chave do catálogo (`validacao.<message>`).

use rust_decimal::Decimal;
use validator::ValidationError;

pub const DIAS_SEMANA: [&str; 7] = ["seg", "ter", "qua", "qui", "sex", "sab", "dom"];

fn erro(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Nome obrigatório: espaços em branco não contam.
pub fn validate_obrigatorio(valor: &str) -> Result<(), ValidationError> {
    if valor.trim().is_empty() {
        return Err(erro("required", "required"));
    }
    Ok(())
}

/// CPF no formato: 11 dígitos, com ou sem pontuação (`123.456.789-09`).
pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    let mut digitos = 0;
    for c in cpf.trim().chars() {
        match c {
            '0'..='9' => digitos += 1,
            '.' | '-' => {}
            _ => return Err(erro("cpf", "invalid_cpf")),
        }
    }
    if digitos != 11 {
        return Err(erro("cpf", "invalid_cpf"));
    }
    Ok(())
}

/// Mês de referência no formato `YYYY-MM`.
pub fn validate_mes_referencia(mes: &str) -> Result<(), ValidationError> {
    if parse_mes_referencia(mes).is_none() {
        return Err(erro("mes_referencia", "invalid_mes_referencia"));
    }
    Ok(())
}

pub fn parse_mes_referencia(mes: &str) -> Option<(i32, u32)> {
    let (ano, mes) = mes.split_once('-')?;
    if ano.len() != 4 || mes.len() != 2 {
        return None;
    }
    let ano: i32 = ano.parse().ok()?;
    let mes: u32 = mes.parse().ok()?;
    (1..=12).contains(&mes).then_some((ano, mes))
}

pub fn validate_dias_semana(dias: &[String]) -> Result<(), ValidationError> {
    for (i, dia) in dias.iter().enumerate() {
        if !DIAS_SEMANA.contains(&dia.as_str()) {
            return Err(erro("dias_semana", "invalid_dia_semana"));
        }
        if dias[..i].contains(dia) {
            return Err(erro("dias_semana", "dias_duplicados"));
        }
    }
    Ok(())
}

// Colunas de dinheiro são NUMERIC(12, 2)
fn check_formato_monetario(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.normalize().scale() > 2 {
        return Err(erro("valor_formato", "valor_casas_decimais"));
    }
    if valor.abs() >= Decimal::new(10_000_000_000, 0) {
        return Err(erro("range", "valor_muito_alto"));
    }
    Ok(())
}

pub fn validate_valor_positivo(valor: &Decimal) -> Result<(), ValidationError> {
    if *valor <= Decimal::ZERO {
        return Err(erro("range", "invalid_valor"));
    }
    check_formato_monetario(valor)
}

pub fn validate_valor_nao_negativo(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.is_sign_negative() {
        return Err(erro("range", "invalid_valor"));
    }
    check_formato_monetario(valor)
}

/// Cor no formato `#RRGGBB`.
pub fn validate_cor_hex(cor: &str) -> Result<(), ValidationError> {
    let valida = cor.len() == 7
        && cor.starts_with('#')
        && cor[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valida {
        return Err(erro("cor", "invalid_cor"));
    }
    Ok(())
}

pub fn validate_tema(tema: &str) -> Result<(), ValidationError> {
    if !matches!(tema, "claro" | "escuro") {
        return Err(erro("tema", "invalid_tema"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpf_accepts_punctuation_and_rejects_wrong_length() {
        assert!(validate_cpf("123.456.789-09").is_ok());
        assert!(validate_cpf("12345678909").is_ok());
        assert!(validate_cpf("1234567890").is_err());
        assert!(validate_cpf("123.456.789/09").is_err());
        assert!(validate_cpf("abc.def.ghi-jk").is_err());
    }

    #[test]
    fn mes_referencia_needs_valid_month() {
        assert_eq!(parse_mes_referencia("2025-03"), Some((2025, 3)));
        assert!(validate_mes_referencia("2025-12").is_ok());
        assert!(validate_mes_referencia("2025-13").is_err());
        assert!(validate_mes_referencia("2025-3").is_err());
        assert!(validate_mes_referencia("03/2025").is_err());
    }

    #[test]
    fn dias_semana_rejects_unknown_and_repeated() {
        let ok: Vec<String> = vec!["seg".into(), "qua".into(), "sex".into()];
        assert!(validate_dias_semana(&ok).is_ok());

        let desconhecido: Vec<String> = vec!["segunda".into()];
        assert!(validate_dias_semana(&desconhecido).is_err());

        let repetido: Vec<String> = vec!["ter".into(), "ter".into()];
        let err = validate_dias_semana(&repetido).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("dias_duplicados"));
    }

    #[test]
    fn valores_monetarios() {
        assert!(validate_valor_positivo(&Decimal::new(15000, 2)).is_ok());
        assert!(validate_valor_positivo(&Decimal::ZERO).is_err());
        assert!(validate_valor_nao_negativo(&Decimal::ZERO).is_ok());
        assert!(validate_valor_nao_negativo(&Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn valores_precisam_caber_na_coluna() {
        // 0.001 viraria 0.00 no banco
        assert!(validate_valor_positivo(&Decimal::new(1, 3)).is_err());
        assert!(validate_valor_nao_negativo(&Decimal::new(12345, 3)).is_err());
        // Zeros à direita não contam como casa decimal
        assert!(validate_valor_positivo(&Decimal::new(150000, 4)).is_ok());

        assert!(validate_valor_positivo(&Decimal::new(999_999_999_999, 2)).is_ok());
        assert!(validate_valor_positivo(&Decimal::new(10_000_000_000, 0)).is_err());
    }

    #[test]
    fn cores_e_temas() {
        assert!(validate_cor_hex("#1A2b3C").is_ok());
        assert!(validate_cor_hex("1A2B3C").is_err());
        assert!(validate_cor_hex("#12345").is_err());
        assert!(validate_tema("escuro").is_ok());
        assert!(validate_tema("azul").is_err());
    }

    #[test]
    fn obrigatorio_ignora_espacos() {
        assert!(validate_obrigatorio("Ana").is_ok());
        assert!(validate_obrigatorio("   ").is_err());
    }
}
