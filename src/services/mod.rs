//! # 비즈니스 로직 계층
//!
//! 라우트 핸들러와 DB 계층 사이에서 실제 동작을 담당합니다.
//!
//! - `chat`: 채팅 메시지를 명령어/드릴 응답으로 나눠 처리
//! - `drill`: 플래시카드 드릴 상태 기계
//! - `grading`: 답 채점과 피드백
//! - `roles`: 역할(교사/학생) 선택
//! - `session_queue`: 저장되는 드릴 상태와 카드 큐
//! - `user_locks`: 사용자별 메시지 직렬화
//! - `weighting`: 진도 기반 가중치와 가중치 추첨

pub mod chat;
pub mod drill;
pub mod grading;
pub mod roles;
pub mod session_queue;
pub mod user_locks;
pub mod weighting;
