//! Asignación de plazas
//!
//! Dada una restricción (hotel, tipo de habitación, género) elige la mejor
//! habitación y su primera plaza libre, y confirma la ocupación con un UPDATE
//! condicional que falla si la plaza ya no está disponible.

use serde::Serialize;
use sqlx::PgConnection;
use std::cmp::Reverse;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Gender, Room, RoomState, RoomType};
use crate::repositories::room_repository::RoomRepository;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("no room with a free place for hotel {hotel_id}, room type {room_type:?}, gender {gender:?}")]
    NoCapacity {
        hotel_id: Uuid,
        room_type: RoomType,
        gender: Gender,
    },

    #[error("room {0} has no free place left")]
    RoomFull(Uuid),

    #[error("room {room_id} does not match the requested {field}")]
    RoomMismatch { room_id: Uuid, field: &'static str },

    #[error("reservation gender must be Male or Female, got {0:?}")]
    InvalidGender(Gender),
}

/// Restricciones de una reserva sobre una ciudad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRequest {
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    pub gender: Gender,
}

impl AllocationRequest {
    pub fn new(hotel_id: Uuid, room_type: RoomType, gender: Gender) -> Result<Self, AllocationError> {
        if gender.is_flexible() {
            return Err(AllocationError::InvalidGender(gender));
        }
        Ok(Self { hotel_id, room_type, gender })
    }

    /// Hotel y tipo idénticos, y género exacto o todavía Mixed
    pub fn matches(&self, room: &Room) -> bool {
        room.hotel_id == self.hotel_id
            && room.room_type == self.room_type
            && room.gender.accepts(self.gender)
    }

    fn no_capacity(&self) -> AllocationError {
        AllocationError::NoCapacity {
            hotel_id: self.hotel_id,
            room_type: self.room_type,
            gender: self.gender,
        }
    }
}

/// Habitación y plaza elegidas
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSelection {
    pub room_id: Uuid,
    pub place_index: i32,
}

/// Clave de orden: (género exacto primero, ocupadas primero, más llena / más libre primero)
fn sort_key(room: &Room, gender: Gender) -> (u8, u8, Reverse<i32>) {
    let gender_rank = if room.gender == gender { 0 } else { 1 };
    let occupied = room.occupied_count();
    if occupied > 0 {
        (gender_rank, 0, Reverse(occupied))
    } else {
        (gender_rank, 1, Reverse(room.remaining_places))
    }
}

/// Filtra y ordena las habitaciones candidatas.
///
/// 1. Solo hotel + tipo iguales, con género exacto o Mixed.
/// 2. Género exacto antes que Mixed.
/// 3. Habitaciones ya ocupadas antes que las vacías, la más ocupada primero.
/// 4. Entre vacías, más `remaining_places` primero.
///
/// El orden es estable: los empates conservan el orden de entrada.
pub fn sort_rooms_by_algorithm<'a>(rooms: &'a [Room], request: &AllocationRequest) -> Vec<&'a Room> {
    let mut candidates: Vec<&Room> = rooms.iter().filter(|room| request.matches(room)).collect();
    candidates.sort_by_key(|room| sort_key(room, request.gender));
    candidates
}

/// Primera candidata con plaza libre, o `NoCapacity`
pub fn select_place(rooms: &[Room], request: &AllocationRequest) -> Result<PlaceSelection, AllocationError> {
    sort_rooms_by_algorithm(rooms, request)
        .into_iter()
        .find_map(|room| {
            room.first_free_place().map(|place_index| PlaceSelection {
                room_id: room.id,
                place_index,
            })
        })
        .ok_or_else(|| request.no_capacity())
}

/// Plazas libres entre las candidatas: cota de carreras que una reserva puede
/// perder, ya que cada carrera perdida consume al menos una plaza
pub fn free_places(rooms: &[Room], request: &AllocationRequest) -> i32 {
    rooms
        .iter()
        .filter(|room| request.matches(room))
        .map(|room| room.remaining_places.max(0))
        .sum()
}

/// Comprueba una habitación elegida de antemano por la interfaz
pub fn check_preselected(room: &Room, request: &AllocationRequest) -> Result<PlaceSelection, AllocationError> {
    if room.hotel_id != request.hotel_id {
        return Err(AllocationError::RoomMismatch { room_id: room.id, field: "hotel" });
    }
    if room.room_type != request.room_type {
        return Err(AllocationError::RoomMismatch { room_id: room.id, field: "room type" });
    }
    if !room.gender.accepts(request.gender) {
        return Err(AllocationError::RoomMismatch { room_id: room.id, field: "gender" });
    }
    room.first_free_place()
        .map(|place_index| PlaceSelection { room_id: room.id, place_index })
        .ok_or(AllocationError::RoomFull(room.id))
}

/// Vista de una habitación candidata para la pantalla de reserva
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPreview {
    pub room_id: Uuid,
    pub gender: Gender,
    pub state: RoomState,
    pub total_places: i32,
    pub occupied_count: i32,
    pub remaining_places: i32,
}

impl From<&Room> for RoomPreview {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id,
            gender: room.gender,
            state: room.state(),
            total_places: room.total_places,
            occupied_count: room.occupied_count(),
            remaining_places: room.remaining_places,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPreview {
    pub candidates: Vec<RoomPreview>,
    pub selected: Option<PlaceSelection>,
    pub no_capacity: bool,
}

pub fn preview(rooms: &[Room], request: &AllocationRequest) -> AllocationPreview {
    let candidates = sort_rooms_by_algorithm(rooms, request)
        .into_iter()
        .map(RoomPreview::from)
        .collect();
    let selected = select_place(rooms, request).ok();
    AllocationPreview {
        candidates,
        no_capacity: selected.is_none(),
        selected,
    }
}

/// Plaza confirmada: la habitación ya actualizada y el índice ocupado
#[derive(Debug, Clone)]
pub struct ClaimedPlace {
    pub room: Room,
    pub place_index: i32,
}

impl ClaimedPlace {
    /// La plaza recién ocupada es la última del prefijo ocupado
    fn from_updated(room: Room) -> Self {
        let place_index = room.occupied_count() - 1;
        Self { room, place_index }
    }
}

/// Elige y ocupa una plaza dentro de la transacción `conn`.
///
/// Con `preselected` solo se intenta esa habitación. Sin ella, se relee el
/// inventario y se vuelve a elegir cada vez que otra reserva gana la carrera
/// por la habitación. Solo se devuelve `NoCapacity` cuando ninguna candidata
/// tiene plaza; si se agotan los reintentos con plazas libres el error es
/// `Conflict` y la petición puede repetirse.
pub async fn claim_place(
    conn: &mut PgConnection,
    program_id: Uuid,
    request: &AllocationRequest,
    preselected: Option<Uuid>,
    reservation_id: Uuid,
) -> AppResult<ClaimedPlace> {
    if let Some(room_id) = preselected {
        let room = RoomRepository::find_in_program(&mut *conn, program_id, room_id)
            .await?
            .ok_or_else(|| crate::utils::errors::not_found_error("Room", &room_id.to_string()))?;
        check_preselected(&room, request)?;
        return match RoomRepository::claim_place(&mut *conn, room_id, reservation_id, request.gender).await? {
            Some(room) => Ok(ClaimedPlace::from_updated(room)),
            None => Err(AllocationError::RoomFull(room_id).into()),
        };
    }

    let mut attempt = 0;
    let mut budget = 0;
    loop {
        let candidates = RoomRepository::find_candidates(&mut *conn, program_id, request).await?;
        let selection = match select_place(&candidates, request) {
            Ok(selection) => selection,
            Err(e) => {
                warn!("🚫 Sin plazas: {}", e);
                return Err(e.into());
            }
        };
        attempt += 1;
        budget = budget.max(attempt + free_places(&candidates, request));

        if let Some(room) =
            RoomRepository::claim_place(&mut *conn, selection.room_id, reservation_id, request.gender).await?
        {
            debug!(
                "🛏️ Reserva {} -> habitación {} plaza {} (intento {})",
                reservation_id, room.id, selection.place_index, attempt
            );
            return Ok(ClaimedPlace::from_updated(room));
        }

        if attempt >= budget {
            warn!("⚠️ Reserva {}: {} carreras perdidas, se abandona", reservation_id, attempt);
            return Err(AppError::Conflict(format!(
                "room inventory for hotel {} kept changing, retry the reservation",
                request.hotel_id
            )));
        }

        warn!(
            "⚠️ Habitación {} ocupada por otra reserva, reintentando (intento {})",
            selection.room_id, attempt
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn room(hotel_id: Uuid, room_type: RoomType, gender: Gender, occupied: i32) -> Room {
        let mut room = Room::new_empty(Uuid::nil(), hotel_id, room_type, Decimal::new(500, 0));
        room.gender = gender;
        for _ in 0..occupied {
            room.reservation_ids.push(Uuid::new_v4());
            room.remaining_places -= 1;
        }
        room
    }

    fn request(hotel_id: Uuid, room_type: RoomType, gender: Gender) -> AllocationRequest {
        AllocationRequest::new(hotel_id, room_type, gender).unwrap()
    }

    #[test]
    fn test_mixed_is_not_a_reservation_gender() {
        let err = AllocationRequest::new(Uuid::new_v4(), RoomType::Double, Gender::Mixed).unwrap_err();
        assert_eq!(err, AllocationError::InvalidGender(Gender::Mixed));
    }

    #[test]
    fn test_filter_excludes_other_gender_hotel_and_type() {
        let hotel = Uuid::new_v4();
        let rooms = vec![
            room(hotel, RoomType::Quadruple, Gender::Female, 1),
            room(Uuid::new_v4(), RoomType::Quadruple, Gender::Mixed, 0),
            room(hotel, RoomType::Triple, Gender::Mixed, 0),
            room(hotel, RoomType::Quadruple, Gender::Mixed, 0),
        ];
        let sorted = sort_rooms_by_algorithm(&rooms, &request(hotel, RoomType::Quadruple, Gender::Male));
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].id, rooms[3].id);
    }

    #[test]
    fn test_sort_prefers_exact_gender_then_fuller_rooms() {
        let hotel = Uuid::new_v4();
        let rooms = vec![
            room(hotel, RoomType::Quadruple, Gender::Mixed, 0),
            room(hotel, RoomType::Quadruple, Gender::Male, 1),
            room(hotel, RoomType::Quadruple, Gender::Male, 3),
            room(hotel, RoomType::Quadruple, Gender::Male, 0),
        ];
        let sorted: Vec<Uuid> = sort_rooms_by_algorithm(&rooms, &request(hotel, RoomType::Quadruple, Gender::Male))
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(sorted, vec![rooms[2].id, rooms[1].id, rooms[3].id, rooms[0].id]);
    }

    #[test]
    fn test_free_rooms_sorted_by_remaining_places() {
        let hotel = Uuid::new_v4();
        let roomier = room(hotel, RoomType::Triple, Gender::Mixed, 0);
        let mut smaller = room(hotel, RoomType::Triple, Gender::Mixed, 0);
        smaller.total_places = 2;
        smaller.remaining_places = 2;
        let rooms = vec![smaller, roomier];
        let sorted = sort_rooms_by_algorithm(&rooms, &request(hotel, RoomType::Triple, Gender::Female));
        assert_eq!(sorted[0].id, rooms[1].id);
    }

    #[test]
    fn test_select_skips_full_rooms_and_picks_first_free_place() {
        let hotel = Uuid::new_v4();
        let rooms = vec![
            room(hotel, RoomType::Double, Gender::Female, 2),
            room(hotel, RoomType::Double, Gender::Female, 1),
        ];
        let selection = select_place(&rooms, &request(hotel, RoomType::Double, Gender::Female)).unwrap();
        assert_eq!(selection, PlaceSelection { room_id: rooms[1].id, place_index: 1 });
    }

    #[test]
    fn test_no_capacity_is_reported_instead_of_overbooking() {
        let hotel = Uuid::new_v4();
        let rooms = vec![
            room(hotel, RoomType::Double, Gender::Male, 2),
            room(hotel, RoomType::Double, Gender::Female, 1),
        ];
        let req = request(hotel, RoomType::Double, Gender::Male);
        assert!(matches!(select_place(&rooms, &req), Err(AllocationError::NoCapacity { .. })));

        let preview = preview(&rooms, &req);
        assert!(preview.no_capacity);
        assert_eq!(preview.candidates.len(), 1);
        assert_eq!(preview.candidates[0].state, RoomState::Full);
    }

    #[test]
    fn test_preselected_room_checks() {
        let hotel = Uuid::new_v4();
        let female = room(hotel, RoomType::Double, Gender::Female, 1);
        let full = room(hotel, RoomType::Double, Gender::Male, 2);

        let male_req = request(hotel, RoomType::Double, Gender::Male);
        assert_eq!(
            check_preselected(&female, &male_req),
            Err(AllocationError::RoomMismatch { room_id: female.id, field: "gender" })
        );
        assert_eq!(check_preselected(&full, &male_req), Err(AllocationError::RoomFull(full.id)));

        let triple_req = request(hotel, RoomType::Triple, Gender::Female);
        assert!(matches!(
            check_preselected(&female, &triple_req),
            Err(AllocationError::RoomMismatch { field: "room type", .. })
        ));

        let female_req = request(hotel, RoomType::Double, Gender::Female);
        assert_eq!(
            check_preselected(&female, &female_req),
            Ok(PlaceSelection { room_id: female.id, place_index: 1 })
        );
    }

    #[test]
    fn test_free_places_counts_only_compatible_rooms() {
        let hotel = Uuid::new_v4();
        let rooms = vec![
            room(hotel, RoomType::Quadruple, Gender::Male, 1),
            room(hotel, RoomType::Quadruple, Gender::Mixed, 0),
            room(hotel, RoomType::Quadruple, Gender::Female, 2),
            room(hotel, RoomType::Quadruple, Gender::Male, 4),
            room(Uuid::new_v4(), RoomType::Quadruple, Gender::Mixed, 0),
        ];
        let req = request(hotel, RoomType::Quadruple, Gender::Male);
        assert_eq!(free_places(&rooms, &req), 3 + 4);

        let full = vec![room(hotel, RoomType::Quadruple, Gender::Male, 4)];
        assert_eq!(free_places(&full, &req), 0);
    }

    #[test]
    fn test_pinned_room_filtered_for_other_gender_after_claim() {
        let hotel = Uuid::new_v4();
        let mut rooms = vec![room(hotel, RoomType::Double, Gender::Mixed, 0)];
        let male_req = request(hotel, RoomType::Double, Gender::Male);
        let selection = select_place(&rooms, &male_req).unwrap();
        assert_eq!(selection.place_index, 0);
        assert!(rooms[0].claim_place(Uuid::new_v4(), Gender::Male));

        let female_req = request(hotel, RoomType::Double, Gender::Female);
        assert!(sort_rooms_by_algorithm(&rooms, &female_req).is_empty());
        assert!(select_place(&rooms, &female_req).is_err());
    }
}
