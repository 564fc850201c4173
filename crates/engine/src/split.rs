//! Equal-share splitting of an expense.
//!
//! Every participant owes `amount_minor / participants` (integer division).
//! The remainder `amount_minor % participants` is not assigned to anybody,
//! so the shares may add up to less than the total. A user id listed twice
//! is charged twice.

use crate::{EngineError, ResultEngine, transactions::Participant};

/// Compute the share of each participant, in the order they were given.
pub fn equal_split(amount_minor: i64, participant_ids: &[i32]) -> ResultEngine<Vec<Participant>> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(
            "amount must be positive".to_string(),
        ));
    }
    if participant_ids.is_empty() {
        return Err(EngineError::Validation("participants required".to_string()));
    }

    let share = amount_minor / participant_ids.len() as i64;
    Ok(participant_ids
        .iter()
        .map(|&user_id| Participant {
            user_id,
            amount_minor: share,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(participants: &[Participant]) -> Vec<i64> {
        participants.iter().map(|p| p.amount_minor).collect()
    }

    #[test]
    fn uneven_split_drops_remainder() {
        let participants = equal_split(100, &[1, 2, 3]).unwrap();
        assert_eq!(shares(&participants), vec![33, 33, 33]);
        assert_eq!(participants.iter().map(|p| p.amount_minor).sum::<i64>(), 99);
    }

    #[test]
    fn even_split_allocates_everything() {
        let participants = equal_split(100, &[1, 2]).unwrap();
        assert_eq!(shares(&participants), vec![50, 50]);
    }

    #[test]
    fn keeps_participant_order() {
        let participants = equal_split(90, &[7, 3, 5]).unwrap();
        let ids: Vec<i32> = participants.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![7, 3, 5]);
    }

    #[test]
    fn duplicate_participant_is_charged_twice() {
        let participants = equal_split(90, &[4, 4, 5]).unwrap();
        assert_eq!(participants.len(), 3);
        assert_eq!(
            participants
                .iter()
                .filter(|p| p.user_id == 4)
                .map(|p| p.amount_minor)
                .sum::<i64>(),
            60
        );
    }

    #[test]
    fn amount_smaller_than_participants_gives_zero_shares() {
        let participants = equal_split(2, &[1, 2, 3]).unwrap();
        assert_eq!(shares(&participants), vec![0, 0, 0]);
    }

    #[test]
    fn rejects_non_positive_amount() {
        for amount in [0, -1, -100] {
            assert_eq!(
                equal_split(amount, &[1, 2]),
                Err(EngineError::Validation(
                    "amount must be positive".to_string()
                ))
            );
        }
    }

    #[test]
    fn rejects_empty_participants() {
        assert_eq!(
            equal_split(100, &[]),
            Err(EngineError::Validation("participants required".to_string()))
        );
    }

    #[test]
    fn shares_are_floor_division_and_never_exceed_total() {
        for amount in 1..=250_i64 {
            for n in 1..=9_usize {
                let ids: Vec<i32> = (1..=n as i32).collect();
                let participants = equal_split(amount, &ids).unwrap();
                let total: i64 = participants.iter().map(|p| p.amount_minor).sum();

                assert!(participants.iter().all(|p| p.amount_minor == amount / n as i64));
                assert!(total <= amount);
                assert_eq!(total == amount, amount % n as i64 == 0);
            }
        }
    }
}
