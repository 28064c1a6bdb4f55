use crate::error::{AuditError, Result};
use crate::models::ProviderIdentity;
use crate::service::WizardSession;
use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

/// 内存中的向导会话表
///
/// 闭包内访问会话，守卫不会跨越 `.await`。
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, WizardSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, provider: ProviderIdentity) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), WizardSession::new(provider));
        id
    }

    pub fn with_session<R>(&self, id: &str, f: impl FnOnce(&WizardSession) -> R) -> Result<R> {
        let session = self
            .sessions
            .get(id)
            .ok_or_else(|| AuditError::SessionNotFound(id.to_string()))?;
        Ok(f(&session))
    }

    pub fn with_session_mut<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut WizardSession) -> R,
    ) -> Result<R> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| AuditError::SessionNotFound(id.to_string()))?;
        Ok(f(&mut session))
    }

    pub fn remove(&self, id: &str) -> Result<WizardSession> {
        self.sessions
            .remove(id)
            .map(|(_, session)| session)
            .ok_or_else(|| AuditError::SessionNotFound(id.to_string()))
    }

    /// 提交被后端受理后结束会话：标记为已提交并移出会话表
    ///
    /// 提交期间会话可能被并发修改或删除，此时只记录日志。
    pub fn finish(&self, id: &str) -> Option<WizardSession> {
        let (_, mut session) = match self.sessions.remove(id) {
            Some(entry) => entry,
            None => {
                warn!("Session {} vanished before submission finished", id);
                return None;
            }
        };
        if let Err(e) = session.mark_submitted() {
            warn!("Session {} changed during submission: {}", id, e);
        }
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
