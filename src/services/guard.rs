// src/services/guard.rs
//
// Regras de isolamento por organização, comuns a todos os serviços.

use crate::{common::error::AppError, models::auth::Auther};

pub(crate) const PERMISSION_NOT_GRANTED: &str = "permission not granted";

// Não-admin só enxerga linhas da própria organização. A divergência vira
// NotFound com a mesma mensagem de uma linha inexistente.
pub(crate) fn ensure_same_tenant(
    auther: &Auther,
    organization_id: Option<i64>,
    not_found: &str,
) -> Result<(), AppError> {
    if auther.is_admin() {
        return Ok(());
    }
    match (auther.organization_id(), organization_id) {
        (Some(own), Some(owner)) if own == owner => Ok(()),
        _ => Err(AppError::not_found(not_found)),
    }
}

// Organização dona de uma criação: o admin precisa informar; o membro sempre
// grava na própria, ignorando o que veio na requisição.
pub(crate) fn owning_tenant(auther: &Auther, requested: Option<i64>) -> Result<i64, AppError> {
    if auther.is_admin() {
        return requested
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::bad_request("organization id is required"));
    }
    auther
        .organization_id()
        .ok_or_else(|| AppError::unauthorized(PERMISSION_NOT_GRANTED))
}

// Exclusão é exclusiva do administrador da plataforma.
pub(crate) fn require_admin(auther: &Auther) -> Result<(), AppError> {
    if auther.is_admin() {
        Ok(())
    } else {
        Err(AppError::unauthorized(PERMISSION_NOT_GRANTED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_only_see_their_own_tenant() {
        let member = Auther::member(1, 10, 3);
        assert!(ensure_same_tenant(&member, Some(10), "no container found").is_ok());

        let err = ensure_same_tenant(&member, Some(20), "no container found").unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "no container found"));
        assert!(ensure_same_tenant(&member, None, "no container found").is_err());
    }

    #[test]
    fn customers_never_match_a_tenant() {
        let customer = Auther::customer(4);
        assert!(ensure_same_tenant(&customer, None, "x").is_err());
        assert!(ensure_same_tenant(&customer, Some(10), "x").is_err());
    }

    #[test]
    fn admins_bypass_tenant_checks() {
        let admin = Auther::admin(1);
        assert!(ensure_same_tenant(&admin, Some(20), "x").is_ok());
        assert!(require_admin(&admin).is_ok());
    }

    #[test]
    fn create_tenant_is_forced_for_members() {
        assert_eq!(owning_tenant(&Auther::member(1, 10, 3), Some(20)).unwrap(), 10);
        assert_eq!(owning_tenant(&Auther::admin(1), Some(20)).unwrap(), 20);
        assert!(matches!(
            owning_tenant(&Auther::admin(1), None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            owning_tenant(&Auther::admin(1), Some(0)),
            Err(AppError::BadRequest(_))
        ));
    }
}
