use crate::dto::common_dto::ApiResponse;
use crate::dto::reservation_dto::{
    AvailabilityQuery, BookingRequest, CreateReservationRequest, PlaceAssignment, QuoteResponse, ReservationResponse,
};
use crate::models::{City, Gender, Hotel, Program, Reservation, Room};
use crate::repositories::{HotelRepository, ProgramRepository, ReservationRepository, RoomRepository};
use crate::services::place_allocator_service::{
    self, check_preselected, preview, AllocationError, AllocationPreview, AllocationRequest,
};
use crate::services::pricing_service::{compute_price, CityStay, PriceInputs};
use crate::utils::errors::{not_found_error, AppError};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Asignación pedida para una ciudad
#[derive(Debug, Clone, Copy)]
struct CityAllocation {
    city: City,
    request: AllocationRequest,
    preselected: Option<Uuid>,
}

pub struct ReservationController {
    pool: PgPool,
}

impl ReservationController {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Candidatas ordenadas y plaza que se asignaría, sin confirmar nada
    pub async fn availability(&self, program_id: Uuid, query: AvailabilityQuery) -> Result<AllocationPreview, AppError> {
        let request = AllocationRequest::new(query.hotel_id, query.room_type, query.gender)?;

        let mut conn = self.pool.acquire().await?;
        find_program(&mut conn, program_id).await?;
        program_hotel(&mut conn, program_id, request.hotel_id).await?;
        let rooms = RoomRepository::find_candidates(&mut conn, program_id, &request).await?;

        Ok(preview(&rooms, &request))
    }

    /// Precio de una reserva con las habitaciones que se asignarían ahora
    pub async fn quote(&self, booking: BookingRequest) -> Result<QuoteResponse, AppError> {
        booking.validate()?;
        let allocations = allocations_for(&booking)?;

        let mut conn = self.pool.acquire().await?;
        let program = find_program(&mut conn, booking.program_id).await?;

        let mut rooms = Vec::new();
        let mut previews = Vec::new();
        for allocation in &allocations {
            ensure_hotel(&mut conn, program.id, allocation.city, allocation.request.hotel_id).await?;
            let candidates = RoomRepository::find_candidates(&mut conn, program.id, &allocation.request).await?;
            let room = match allocation.preselected {
                Some(room_id) => {
                    let room = RoomRepository::find_in_program(&mut conn, program.id, room_id)
                        .await?
                        .ok_or_else(|| not_found_error("Room", &room_id.to_string()))?;
                    check_preselected(&room, &allocation.request)?;
                    room
                }
                None => {
                    let selection = place_allocator_service::select_place(&candidates, &allocation.request)?;
                    candidates
                        .iter()
                        .find(|room| room.id == selection.room_id)
                        .cloned()
                        .ok_or_else(|| AppError::Internal("Selected room missing from candidates".to_string()))?
                }
            };
            previews.push((allocation.city, preview(&candidates, &allocation.request)));
            rooms.push((allocation.city, room));
        }

        let breakdown = compute_price(&price_inputs(&program, &booking, &rooms));
        let mut response = QuoteResponse {
            price: breakdown.total,
            breakdown,
            madina: None,
            makkah: None,
        };
        for (city, city_preview) in previews {
            match city {
                City::Madina => response.madina = Some(city_preview),
                City::Makkah => response.makkah = Some(city_preview),
            }
        }

        Ok(response)
    }

    /// Crea la reserva: ocupa una plaza por ciudad, calcula el precio y la
    /// persiste. Todo o nada: si una ciudad no tiene plaza, ninguna queda ocupada.
    pub async fn create(&self, request: CreateReservationRequest) -> Result<ApiResponse<ReservationResponse>, AppError> {
        request.validate()?;
        let booking = &request.booking;
        let allocations = allocations_for(booking)?;

        let mut tx = self.pool.begin().await?;
        let program = ProgramRepository::lock_shared(&mut tx, booking.program_id)
            .await?
            .ok_or_else(|| not_found_error("Program", &booking.program_id.to_string()))?;
        for allocation in &allocations {
            ensure_hotel(&mut tx, program.id, allocation.city, allocation.request.hotel_id).await?;
        }

        let reservation_id = Uuid::new_v4();
        let mut rooms = Vec::new();
        let mut places = Vec::new();
        for allocation in &allocations {
            let claimed = place_allocator_service::claim_place(
                &mut tx,
                program.id,
                &allocation.request,
                allocation.preselected,
                reservation_id,
            )
            .await?;
            places.push(PlaceAssignment {
                city: allocation.city,
                hotel_id: claimed.room.hotel_id,
                room_id: claimed.room.id,
                place_index: claimed.place_index,
                room_gender: claimed.room.gender,
                remaining_places: claimed.room.remaining_places,
            });
            rooms.push((allocation.city, claimed.room));
        }

        let breakdown = compute_price(&price_inputs(&program, booking, &rooms));
        let room_at = |city: City| rooms.iter().find(|(c, _)| *c == city).map(|(_, room)| room.id);
        let reservation = Reservation {
            id: reservation_id,
            program_id: program.id,
            room_type: booking.room_type,
            gender: booking.gender,
            madina_room_id: room_at(City::Madina),
            makkah_room_id: room_at(City::Makkah),
            client_name: request.client_name.trim().to_string(),
            phone: request.phone.clone(),
            passport_number: request.passport_number.clone(),
            days_madina: effective_days(&program, booking, City::Madina),
            days_makkah: effective_days(&program, booking, City::Makkah),
            include_flight: booking.include_flight,
            include_visa: booking.include_visa,
            price: breakdown.total,
            is_paid: false,
            documents_complete: false,
            created_at: Utc::now(),
        };
        let reservation = ReservationRepository::create(&mut tx, &reservation).await?;
        tx.commit().await?;

        info!(
            "✅ Reserva {} creada para '{}' ({} plazas, precio {})",
            reservation.id,
            reservation.client_name,
            places.len(),
            reservation.price
        );

        Ok(ApiResponse::success_with_message(
            ReservationResponse { reservation, places, breakdown },
            "Reserva creada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Reservation, AppError> {
        let mut conn = self.pool.acquire().await?;
        ReservationRepository::find_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))
    }

    pub async fn list_by_program(&self, program_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let mut conn = self.pool.acquire().await?;
        find_program(&mut conn, program_id).await?;
        ReservationRepository::find_by_program(&mut conn, program_id).await
    }

    /// Cancela la reserva y libera sus plazas. El programa se bloquea antes
    /// que la reserva para respetar el orden del borrado en cascada.
    pub async fn cancel(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let program_id = ReservationRepository::find_by_id(&mut tx, id)
            .await?
            .map(|reservation| reservation.program_id)
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;
        ProgramRepository::lock_shared(&mut tx, program_id).await?;
        let reservation = ReservationRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Reservation", &id.to_string()))?;

        for room_id in reservation.occupied_rooms() {
            if RoomRepository::release_place(&mut tx, room_id, reservation.id).await?.is_none() {
                warn!("⚠️ La reserva {} no figuraba como ocupante de la habitación {}", reservation.id, room_id);
            }
        }
        ReservationRepository::delete(&mut tx, reservation.id).await?;
        tx.commit().await?;

        info!("🗑️ Reserva {} cancelada", id);
        Ok(())
    }
}

/// Traduce las elecciones por ciudad a peticiones de asignación. El género se
/// valida aunque la reserva no lleve hotel.
fn allocations_for(booking: &BookingRequest) -> Result<Vec<CityAllocation>, AppError> {
    if booking.gender == Gender::Mixed {
        return Err(AllocationError::InvalidGender(booking.gender).into());
    }

    City::ALL
        .into_iter()
        .filter_map(|city| booking.choice(city).map(|choice| (city, choice)))
        .map(|(city, choice)| -> Result<CityAllocation, AppError> {
            Ok(CityAllocation {
                city,
                request: AllocationRequest::new(choice.hotel_id, booking.room_type, booking.gender)?,
                preselected: choice.room_id,
            })
        })
        .collect()
}

fn effective_days(program: &Program, booking: &BookingRequest, city: City) -> i32 {
    booking.days_override(city).unwrap_or_else(|| program.days_at(city))
}

fn price_inputs(program: &Program, booking: &BookingRequest, rooms: &[(City, Room)]) -> PriceInputs {
    let mut inputs = PriceInputs::from_program(program, booking.room_type);
    inputs.include_flight = booking.include_flight;
    inputs.include_visa = booking.include_visa;
    for (city, room) in rooms {
        let stay = CityStay {
            room_price: room.price,
            days: effective_days(program, booking, *city),
        };
        match city {
            City::Madina => inputs.madina = Some(stay),
            City::Makkah => inputs.makkah = Some(stay),
        }
    }
    inputs
}

async fn find_program(conn: &mut PgConnection, program_id: Uuid) -> Result<Program, AppError> {
    ProgramRepository::find_by_id(conn, program_id)
        .await?
        .ok_or_else(|| not_found_error("Program", &program_id.to_string()))
}

/// El hotel debe existir, estar en la ciudad pedida y pertenecer al programa
async fn ensure_hotel(conn: &mut PgConnection, program_id: Uuid, city: City, hotel_id: Uuid) -> Result<Hotel, AppError> {
    let hotel = program_hotel(conn, program_id, hotel_id).await?;
    if hotel.city != city {
        return Err(AppError::BadRequest(format!("Hotel '{}' is not in {:?}", hotel.name, city)));
    }

    Ok(hotel)
}

/// Hotel enlazado al programa en su propia ciudad
async fn program_hotel(conn: &mut PgConnection, program_id: Uuid, hotel_id: Uuid) -> Result<Hotel, AppError> {
    let hotel = HotelRepository::find_by_id(&mut *conn, hotel_id)
        .await?
        .ok_or_else(|| not_found_error("Hotel", &hotel_id.to_string()))?;

    if !HotelRepository::is_linked(&mut *conn, program_id, &hotel).await? {
        return Err(AppError::BadRequest(format!(
            "Hotel '{}' is not part of program {}",
            hotel.name, program_id
        )));
    }

    Ok(hotel)
}
